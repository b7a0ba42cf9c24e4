//! CLI argument parsing for the rag tool.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Embedding-agnostic document retrieval
#[derive(Parser, Debug)]
#[command(name = "rag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides CONFIG_PATH and ~/.config/rag-chroma/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Override listen host
        #[arg(long)]
        host: Option<String>,

        /// Override listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ingest .txt and .md files; directories are walked recursively
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Search stored documents
    Search {
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = 5)]
        n_results: usize,

        /// Minimum similarity score (0.0 to 1.0)
        #[arg(short, long, default_value_t = 0.2)]
        threshold: f64,
    },

    /// List stored files
    Files,

    /// Move a document to another logical directory
    Move { doc_id: String, directory: String },

    /// Remove every document stored under a filename
    Remove { filename: String },
}
