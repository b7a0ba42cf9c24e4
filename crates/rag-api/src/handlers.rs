//! Route handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use rag_service::{DirectoryUpdateReport, IngestReport, RetrievalService};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::models::{
    ApiResponse, FilesData, IngestRequest, RemoveData, SearchData, SearchRequest,
    UpdateDirectoriesRequest,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RetrievalService>,
}

impl AppState {
    pub fn new(service: Arc<RetrievalService>) -> Self {
        Self { service }
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "RAG WebAPI is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FilesData>>, ApiError> {
    let files = state.service.list_files()?;
    let total_count = files.len();
    Ok(Json(ApiResponse::ok(FilesData { files, total_count })))
}

pub async fn search(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SearchRequest>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    debug!(query = %req.query, n_results = req.n_results, threshold = req.threshold, "Search request");

    let results = state
        .service
        .search(&req.query, req.n_results, req.threshold)
        .await?;

    if results.is_empty() {
        return Err(ApiError::not_found(
            "No search results",
            "No documents matched the query at the requested threshold.",
        ));
    }

    Ok(Json(ApiResponse::ok(SearchData {
        query: req.query,
        threshold: req.threshold,
        hit_count: results.len(),
        results,
    })))
}

pub async fn ingest_documents(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<IngestRequest>,
) -> Result<Json<ApiResponse<IngestReport>>, ApiError> {
    let (filenames, texts): (Vec<String>, Vec<String>) = req
        .documents
        .into_iter()
        .map(|doc| (doc.filename, doc.text))
        .unzip();

    let report = state.service.ingest(texts, filenames).await?;
    info!(added = report.doc_ids.len(), "Documents ingested via API");
    Ok(Json(ApiResponse::ok(report)))
}

pub async fn update_directories(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateDirectoriesRequest>,
) -> Result<Json<ApiResponse<DirectoryUpdateReport>>, ApiError> {
    let report = state.service.update_directories(&req.updates)?;
    Ok(Json(ApiResponse::ok(report)))
}

pub async fn remove_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<RemoveData>>, ApiError> {
    let removed = state.service.remove_file(&filename)?;
    if removed == 0 {
        return Err(ApiError::not_found(
            "File not found",
            format!("No documents are stored under {}", filename),
        ));
    }
    Ok(Json(ApiResponse::ok(RemoveData { filename, removed })))
}
