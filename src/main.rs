use anyhow::Result;
use colored::Colorize;
use env_logger::{Builder, Target};
use log::LevelFilter;
use otustats::cli::Commands;
use otustats::*;
use std::time::Instant;

fn main() -> Result<()> {
    parse_cli()
}

pub fn parse_cli() -> Result<()> {
    let pg_start = Instant::now();
    let args = cli::make_cli_parse();

    // set the logging level
    let min_log_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .target(Target::Stderr)
        .filter(None, min_log_level)
        .init();

    log::debug!("DEBUG logging enabled");
    log::trace!("TRACE logging enabled");

    let subcommand = match &args.command {
        //
        // Run Abundance
        //
        Some(Commands::Abundance { otu_table }) => {
            let summary = abundance::abundance_from_file(otu_table)?;
            println!("{}", summary);
            "abundance"
        }
        //
        // Run Identity
        //
        Some(Commands::Identity {
            otu_table,
            save,
            bins,
        }) => {
            let stats = identity::identity_distribution(otu_table, save, *bins)?;
            println!("{}", stats);
            "identity"
        }
        //
        // Run LengthHisto
        //
        Some(Commands::LengthHisto {
            fasta,
            output_image,
            bins,
        }) => {
            fastx::length_histogram(fasta, output_image, *bins)?;
            "length-histo"
        }
        //
        // no command opt
        //
        None => return Ok(()),
    };

    let duration = pg_start.elapsed();
    log::info!(
        "{} done! Time elapsed: {}",
        subcommand.bright_green().bold(),
        format!("{:.2?}", duration).bright_yellow().bold()
    );
    Ok(())
}
