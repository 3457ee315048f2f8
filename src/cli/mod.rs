//! Command-line interface for ticket-desk

pub mod handlers;
mod output;

pub use output::{OutputFormatter, colored_priority};

use crate::config::BackendKind;
use crate::core::Priority;
use crate::import_export::{DataFormat, DuplicateKey, DuplicatePolicy};
use crate::query::{SortDirection, SortField};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Support ticket desk: manage, prioritize, import and export tickets
#[derive(Debug, Parser)]
#[command(name = "ticket-desk", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./ticket-desk.{toml,yaml,json} when present)
    #[arg(short, long, global = true, env = "TICKET_DESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Persistence backend, overriding the configuration
    #[arg(short, long, global = true)]
    pub backend: Option<BackendKind>,

    /// Directory for local storage, overriding the configuration
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List tickets
    List {
        /// Match name, surname, email or full name
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(long, value_enum, default_value_t = SortField::Date)]
        sort: SortField,

        /// Defaults to newest first for dates, A to Z otherwise
        #[arg(long, value_enum)]
        direction: Option<SortDirection>,

        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Defaults to ui.page_size
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show one ticket
    Show { id: String },

    /// Create a ticket
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        description: String,
        #[arg(short, long, default_value_t = Priority::Medium)]
        priority: Priority,
    },

    /// Change fields of a ticket
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        surname: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Move a ticket to another priority
    Priority { id: String, priority: Priority },

    /// Delete a ticket
    Delete { id: String },

    /// Show tickets grouped by priority
    Board,

    /// Import tickets from a CSV or JSON file
    Import {
        file: PathBuf,

        /// Declared content type, used when the extension is not recognized
        #[arg(long)]
        content_type: Option<String>,

        /// What to do with tickets that already exist
        #[arg(long)]
        duplicates: Option<DuplicatePolicy>,

        /// How an incoming ticket is matched to an existing one
        #[arg(long)]
        key: Option<DuplicateKey>,

        /// Only validate and report
        #[arg(long)]
        dry_run: bool,
    },

    /// Export tickets to CSV or JSON
    Export {
        #[arg(short, long, default_value_t = DataFormat::Json)]
        format: DataFormat,

        /// Leave out the metadata block of JSON exports
        #[arg(long)]
        no_metadata: bool,

        /// Defaults to tickets_<date>.<ext>
        #[arg(long)]
        filename: Option<String>,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}
