//! rag: embedding-agnostic document retrieval
//!
//! # Usage
//!
//! ```bash
//! rag serve [--host HOST] [--port PORT]
//! rag ingest <PATH>...
//! rag search <QUERY> [-n N] [-t THRESHOLD]
//! rag files
//! rag move <DOC_ID> <DIRECTORY>
//! rag remove <FILENAME>
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/rag-chroma/config.toml)
//! 3. `--config` or `CONFIG_PATH`
//! 4. Environment variables (RAG__SECTION__KEY)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use rag_daemon::{
    init_logging, load_settings, run_files, run_ingest, run_move, run_remove, run_search,
    run_serve, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Serve { host, port } => {
            run_serve(settings, host, port).await?;
        }
        Commands::Ingest { paths } => {
            run_ingest(&settings, &paths).await?;
        }
        Commands::Search {
            query,
            n_results,
            threshold,
        } => {
            run_search(&settings, &query, n_results, threshold).await?;
        }
        Commands::Files => {
            run_files(&settings)?;
        }
        Commands::Move { doc_id, directory } => {
            run_move(&settings, &doc_id, &directory)?;
        }
        Commands::Remove { filename } => {
            run_remove(&settings, &filename)?;
        }
    }

    Ok(())
}
