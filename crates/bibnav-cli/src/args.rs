use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::LogLevel;

#[derive(Parser)]
#[command(name = "bibnav")]
#[command(about = "Browse and edit a labelled record collection from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (defaults to $BIBNAV_PATH, then the XDG data directory)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Configuration file (defaults to <config dir>/bibnav/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Record file, overriding `database.file` from the configuration
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log file (defaults to bibnav.log in the data directory)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive browser (the default)
    Tui,

    /// Print the record list
    List {
        /// List arguments: -l, -r, -s FIELD, FIELD=VALUE
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print one record
    Show { label: String },

    /// Search the records
    Search {
        query: String,

        /// Lines shown per match
        #[arg(short = 'c', long)]
        context: Option<usize>,

        /// List arguments restricting the searched records
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Write the default configuration and an empty record file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}
