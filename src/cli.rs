use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::CapabilityKind;

/// devspec - Device capability resolver
#[derive(Parser, Debug)]
#[command(name = "devspec")]
#[command(about = "Resolve processor, screen, battery, storage and RAM capabilities of this device")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file (overrides and host sources).
    ///
    /// Falls back to the DEVSPEC_CONFIG environment variable, then to
    /// built-in defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Mount point measured for storage size (default: /data)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Set a host property, taking priority over build.prop files
    #[arg(short, long = "prop", value_name = "KEY=VALUE", global = true)]
    pub props: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a single capability
    Show {
        /// processor, screen, battery, storage, ram, summary or device
        kind: CapabilityKind,
        /// Prefix storage and RAM values with their label
        #[arg(short, long)]
        labelled: bool,
    },
    /// Resolve every capability (default command)
    All {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
    /// Print the default configuration as JSON
    Defaults,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
