//! Command-line argument definitions for the structviz CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments choose where the input comes from (a file, a
//! share token or a built-in sample), how it is laid out and where the
//! layout JSON is written.

use clap::Parser;

/// Command-line arguments for the structviz layout tool
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input file
    #[arg(
        help = "Path to the input file",
        required_unless_present_any = ["share", "sample"]
    )]
    pub input: Option<String>,

    /// Path to the output JSON file
    #[arg(short, long, default_value = "layout.json")]
    pub output: String,

    /// Structure type to draw the input as, or `auto` to classify it
    #[arg(short = 't', long = "type", default_value = "auto")]
    pub kind: String,

    /// Replay a share token instead of reading the input file
    #[arg(long, conflicts_with_all = ["input", "sample"])]
    pub share: Option<String>,

    /// Lay out the built-in sample for a structure type
    #[arg(long, conflicts_with = "input")]
    pub sample: Option<String>,

    /// Viewport width, overriding the configuration
    #[arg(long)]
    pub width: Option<f32>,

    /// Viewport height, overriding the configuration
    #[arg(long)]
    pub height: Option<f32>,

    /// Maximum number of graph simulation ticks
    #[arg(long)]
    pub max_ticks: Option<usize>,

    /// Reject input that is not strictly valid instead of reading it by lines
    #[arg(long)]
    pub strict: bool,

    /// Write the re-indented input instead of its layout
    #[arg(long)]
    pub format: bool,

    /// Print a share token for the input to stdout
    #[arg(long)]
    pub print_share: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace); defaults to the
    /// configuration file's `cli.log_level`, then `info`
    #[arg(long)]
    pub log_level: Option<String>,
}
