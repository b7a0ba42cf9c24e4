//! rag command-line tool.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (serve, ingest, search, files, move, remove)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    collect_files, init_logging, load_settings, run_files, run_ingest, run_move, run_remove,
    run_search, run_serve,
};
