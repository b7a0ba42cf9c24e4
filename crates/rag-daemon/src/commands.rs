//! Command implementations.
//!
//! Logs go to stderr so command output on stdout stays scriptable.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rag_api::{create_cors_layer, create_router, serve, AppState};
use rag_service::RetrievalService;
use rag_types::{DirectoryUpdate, Settings};
use tracing::{info, warn};
use walkdir::WalkDir;

/// File extensions picked up by `ingest`
pub const INGEST_EXTENSIONS: &[&str] = &["txt", "md"];

/// Load layered settings and apply the global CLI overrides.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn build_service(settings: &Settings) -> Result<RetrievalService> {
    RetrievalService::from_settings(settings).context("Failed to initialise retrieval service")
}

/// Run the HTTP API until Ctrl-C or SIGTERM.
pub async fn run_serve(
    mut settings: Settings,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    if let Some(host) = host_override {
        settings.server.host = host;
    }
    if let Some(port) = port_override {
        settings.server.port = port;
    }

    info!("RAG API starting...");
    info!("Configuration:");
    info!("  Persist directory: {}", settings.store.persist_directory);
    info!("  Embedder: {}", settings.embedder.kind.as_str());
    info!("  Address: {}", settings.server.addr());
    info!("  Log level: {}", settings.log_level);

    let service = Arc::new(build_service(&settings)?);
    let cors = create_cors_layer(&settings.server.cors_allowed_origins)
        .context("Invalid CORS configuration")?;
    let router = create_router(AppState::new(service), cors);

    serve(router, &settings.server.addr())
        .await
        .context("HTTP server failed")?;
    Ok(())
}

fn is_ingestible(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| INGEST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand `paths` into ingestible files. Directories are walked recursively
/// in name order; explicit files are taken as given.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Failed to walk {:?}", path))?;
                if entry.file_type().is_file() && is_ingestible(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("No such file or directory: {:?}", path);
        }
    }
    Ok(files)
}

/// Read files as UTF-8 text keyed by base filename. Unreadable files and
/// repeated base names are skipped with a warning.
fn read_documents(files: &[PathBuf]) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut texts = Vec::new();
    let mut filenames = Vec::new();

    for file in files {
        let Some(name) = file.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        if !seen.insert(name.clone()) {
            warn!(path = ?file, filename = %name, "Skipping file with repeated name");
            continue;
        }
        match std::fs::read_to_string(file) {
            Ok(text) => {
                texts.push(text);
                filenames.push(name);
            }
            Err(e) => warn!(path = ?file, error = %e, "Skipping unreadable file"),
        }
    }
    (texts, filenames)
}

pub async fn run_ingest(settings: &Settings, paths: &[PathBuf]) -> Result<()> {
    let files = collect_files(paths)?;
    let (texts, filenames) = read_documents(&files);
    if texts.is_empty() {
        bail!("No .txt or .md files found");
    }

    let service = build_service(settings)?;
    let report = service
        .ingest(texts, filenames.clone())
        .await
        .context("Ingest failed")?;

    for (filename, doc_id) in filenames.iter().zip(&report.doc_ids) {
        println!("{}\t{}", doc_id, filename);
    }
    println!(
        "Ingested {} file(s), replaced {}",
        report.doc_ids.len(),
        report.replaced
    );
    Ok(())
}

pub async fn run_search(
    settings: &Settings,
    query: &str,
    n_results: usize,
    threshold: f64,
) -> Result<()> {
    let service = build_service(settings)?;
    let hits = service
        .search(query, n_results, threshold)
        .await
        .context("Search failed")?;

    if hits.is_empty() {
        println!("No documents matched (threshold {})", threshold);
        return Ok(());
    }
    for hit in hits {
        println!("{}. {} (score {:.4})", hit.rank, hit.filename, hit.score);
        println!("{}", hit.document);
        println!();
    }
    Ok(())
}

pub fn run_files(settings: &Settings) -> Result<()> {
    let service = build_service(settings)?;
    let files = service.list_files().context("Failed to list files")?;

    println!("{:<10} {:<30} {:<20} CREATED", "ID", "FILENAME", "DIRECTORY");
    for file in &files {
        println!(
            "{:<10} {:<30} {:<20} {}",
            file.doc_id, file.filename, file.directory, file.created_at
        );
    }
    println!("{} file(s)", files.len());
    Ok(())
}

pub fn run_move(settings: &Settings, doc_id: &str, directory: &str) -> Result<()> {
    let service = build_service(settings)?;
    let report = service
        .update_directories(&[DirectoryUpdate::new(doc_id, directory)])
        .context("Directory update failed")?;

    if let Some(failure) = report.failed.first() {
        bail!("Could not move {}: {}", failure.doc_id, failure.error);
    }
    println!("Moved {} to {}", doc_id, directory);
    Ok(())
}

pub fn run_remove(settings: &Settings, filename: &str) -> Result<()> {
    let service = build_service(settings)?;
    let removed = service.remove_file(filename).context("Remove failed")?;
    if removed == 0 {
        println!("No documents stored under {}", filename);
    } else {
        println!("Removed {} document(s) for {}", removed, filename);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_filters_extensions() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        std::fs::write(temp.path().join("b.MD"), "b").unwrap();
        std::fs::write(temp.path().join("c.pdf"), "c").unwrap();
        std::fs::write(nested.join("d.md"), "d").unwrap();

        let files = collect_files(&[temp.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.MD", "d.md"]);
    }

    #[test]
    fn test_collect_explicit_file_and_missing_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.csv");
        std::fs::write(&file, "x").unwrap();

        assert_eq!(collect_files(&[file.clone()]).unwrap(), vec![file]);
        assert!(collect_files(&[temp.path().join("missing")]).is_err());
    }

    #[test]
    fn test_read_documents_skips_repeats_and_binary() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("one");
        let second = temp.path().join("two");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(first.join("same.txt"), "first").unwrap();
        std::fs::write(second.join("same.txt"), "second").unwrap();
        std::fs::write(first.join("bin.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let (texts, names) = read_documents(&[
            first.join("same.txt"),
            second.join("same.txt"),
            first.join("bin.txt"),
        ]);
        assert_eq!(texts, vec!["first"]);
        assert_eq!(names, vec!["same.txt"]);
    }

    #[test]
    fn test_load_settings_applies_log_level() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();

        let settings = load_settings(path.to_str(), Some("debug")).unwrap();
        assert_eq!(settings.log_level, "debug");
    }
}
