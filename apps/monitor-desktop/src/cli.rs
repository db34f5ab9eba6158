//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the settings file (defaults to the per-user config directory).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Probe the configured device once, print the result and exit.
    #[arg(short, long)]
    pub test_connection: bool,
}
