//! # Command line interface for otustats
//! [otustats command line interface, subcommands, and options.](cli::Commands)
//! # README for otustats
#![doc = include_str!("../README.md")]
/// Relative abundance of mycota taxa in an OTU table.
pub mod abundance;
/// Command line interface for otustats.
pub mod cli;
/// Sequence lengths from fasta files.
pub mod fastx;
/// Equal width histograms.
pub mod histogram;
/// Distribution of the identity column of an OTU table.
pub mod identity;
/// Module for automatically reading compressed or uncompressed files.
pub mod myio;
/// Tab separated OTU tables.
pub mod otu;
/// PNG rendering of histograms.
pub mod plot;
