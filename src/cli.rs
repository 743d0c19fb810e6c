use clap::IntoApp;
use clap::{AppSettings, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    propagate_version = true,
    subcommand_required = true,
    infer_subcommands = true,
    arg_required_else_help = true,
    help_expected = true
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
pub struct Cli {
    /// Logging level [-v: Info, -vv: Debug, -vvv: Trace].
    #[clap(short, long, parse(from_occurrences), help_heading = "DEBUG")]
    pub verbose: usize,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

///
/// This structure contains all the subcommands for otustats and their help descriptions.
///
/// Because of naming conventions for rust enums the commands names have
/// different capitalization than on the command line.
/// For example, the `LengthHisto` enum is invoked using `otustats length-histo`.
///
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relative abundance of the taxa with a rank ending in "mycota".
    ///
    /// Reads a tab separated OTU table with `taxonomy` and `abundance` columns.
    /// The taxonomy is split on `|` and an OTU counts as mycota if any rank ends in "mycota".
    /// Abundances that are not numbers count as zero.
    #[clap(visible_aliases = &["ab", "mycota"])]
    Abundance {
        /// OTU table to analyse (tsv, optionally gzipped, "-" for stdin).
        otu_table: String,
    },
    /// Plot the distribution of the `identity` column of an OTU table.
    ///
    /// Summary statistics (mean, median, std, variance, min, max, quartiles) are printed to stdout
    /// and a histogram with the mean (red) and median (blue) marked is written as a PNG.
    #[clap(visible_aliases = &["id", "identity-distribution"])]
    Identity {
        /// OTU table to analyse (tsv, optionally gzipped, "-" for stdin).
        otu_table: String,
        /// Output image (PNG format).
        #[clap(short, long, default_value = "identity_distribution.png")]
        save: String,
        /// Number of histogram bins.
        #[clap(short, long, default_value_t = 30)]
        bins: usize,
    },
    /// Plot a histogram of the sequence lengths in a fasta file.
    #[clap(visible_aliases = &["lh", "length-histogram"])]
    LengthHisto {
        /// Input fasta (or fastq) file, optionally gzipped.
        fasta: String,
        /// Output image file for the histogram (PNG format).
        output_image: String,
        /// Number of histogram bins.
        #[clap(short, long, default_value_t = 50)]
        bins: usize,
    },
}

pub fn make_cli_parse() -> Cli {
    Cli::parse()
}

pub fn make_cli_app() -> clap::Command<'static> {
    Cli::command()
}
