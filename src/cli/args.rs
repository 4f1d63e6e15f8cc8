//! CLI argument definitions using clap
//!
//! Commands:
//! - folio init
//! - folio write <collection> <resource> [--value <json>]
//! - folio read <collection> <resource>
//! - folio delete <collection> <resource>
//! - folio list <collection>
//! - folio stream <collection>
//! - folio seed

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// folio - a minimal JSON document store
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file (overrides --dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory of the store
    #[arg(long, global = true, default_value = "./data")]
    pub dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the root directory if it does not exist
    Init,

    /// Write one record; the value comes from --value or one line of stdin
    Write {
        collection: String,
        resource: String,

        /// Record value as JSON
        #[arg(long)]
        value: Option<String>,
    },

    /// Print one record
    Read { collection: String, resource: String },

    /// Remove one record
    Delete { collection: String, resource: String },

    /// Print every record of a collection as a JSON array
    List { collection: String },

    /// Print every record of a collection, one JSON line each
    Stream { collection: String },

    /// Write the sample users into the `users` collection and print them
    Seed,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
