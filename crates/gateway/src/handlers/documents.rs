//! Document upload and index management handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::AppState;
use ragline_common::errors::{AppError, Result};
use ragline_common::metrics::RequestMetrics;

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<FileResult>,
    pub total_chunks: usize,
}

/// Per-file ingestion outcome. A failing file is reported here and never
/// aborts the other files in the same upload.
#[derive(Serialize)]
pub struct FileResult {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Ingest one or more uploaded documents.
///
/// Multipart fields: `files` (repeatable) and an optional `chunk_size`
/// override bounded by the configured min/max.
pub async fn upload_documents(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let metrics = RequestMetrics::start("POST", "/upload-documents");

    let result = process_upload(&state, multipart).await;
    match &result {
        Ok(_) => metrics.finish(200),
        Err(e) => metrics.finish(e.status_code().as_u16()),
    }
    result.map(Json)
}

async fn process_upload(state: &AppState, mut multipart: Multipart) -> Result<UploadResponse> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut chunk_size = state.config.chunking.chunk_size;

    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Validation {
        message: format!("Invalid multipart payload: {}", e),
        field: None,
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "files" => {
                let filename = field
                    .file_name()
                    .ok_or_else(|| AppError::Validation {
                        message: "File field is missing a filename".to_string(),
                        field: Some("files".to_string()),
                    })?
                    .to_string();
                let data = field.bytes().await.map_err(|e| AppError::Validation {
                    message: format!("Failed to read file '{}': {}", filename, e),
                    field: Some("files".to_string()),
                })?;
                files.push((filename, data.to_vec()));
            }
            "chunk_size" => {
                let text = field.text().await.map_err(|e| AppError::Validation {
                    message: format!("Invalid chunk_size field: {}", e),
                    field: Some("chunk_size".to_string()),
                })?;
                chunk_size = parse_chunk_size(
                    &text,
                    state.config.chunking.min_chunk_size,
                    state.config.chunking.max_chunk_size,
                )?;
            }
            other => {
                warn!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    if files.is_empty() {
        return Err(AppError::Validation {
            message: "No files provided".to_string(),
            field: Some("files".to_string()),
        });
    }

    let file_count = files.len();
    let mut results = Vec::with_capacity(file_count);
    let mut total_chunks = 0;

    for (filename, data) in files {
        match state.pipeline.ingest_bytes(&filename, &data, chunk_size).await {
            Ok(report) => {
                info!(filename = %filename, chunks = report.chunk_count, "File ingested");
                total_chunks += report.chunk_count;
                results.push(FileResult {
                    filename,
                    chunks: Some(report.chunk_count),
                    error: None,
                    success: true,
                });
            }
            Err(e) => {
                warn!(filename = %filename, error = %e, "File ingestion failed");
                results.push(FileResult {
                    filename,
                    chunks: None,
                    error: Some(e.to_string()),
                    success: false,
                });
            }
        }
    }

    Ok(UploadResponse {
        success: true,
        message: format!(
            "Processed {} files, ingested {} chunks",
            file_count, total_chunks
        ),
        results,
        total_chunks,
    })
}

/// Delete every vector in the index.
pub async fn delete_documents(State(state): State<AppState>) -> Result<Json<DeleteResponse>> {
    state.store.delete_all().await?;
    info!("Index wiped");

    Ok(Json(DeleteResponse {
        success: true,
        message: "All documents deleted".to_string(),
    }))
}

fn parse_chunk_size(text: &str, min: usize, max: usize) -> Result<usize> {
    let value: usize = text.trim().parse().map_err(|_| AppError::Validation {
        message: format!("chunk_size must be an integer, got '{}'", text),
        field: Some("chunk_size".to_string()),
    })?;

    if value < min || value > max {
        return Err(AppError::Validation {
            message: format!("chunk_size must be between {} and {}", min, max),
            field: Some("chunk_size".to_string()),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size_override_bounds() {
        assert_eq!(parse_chunk_size("300", 200, 800).unwrap(), 300);
        assert_eq!(parse_chunk_size(" 800 ", 200, 800).unwrap(), 800);
        assert!(matches!(
            parse_chunk_size("100", 200, 800),
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            parse_chunk_size("big", 200, 800),
            Err(AppError::Validation { .. })
        ));
    }
}
