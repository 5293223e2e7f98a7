use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::core::config::settings::UploadSettings;
use crate::core::errors::ApiError;
use crate::server::handlers::config::format_megabytes;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub count: usize,
    pub file_ids: Vec<String>,
    pub message: String,
    pub chunks_ingested: usize,
}

struct UploadedFile {
    name: String,
    contents: Vec<u8>,
}

/// Accepts one or more text documents under the `files` field, chunks them
/// and ingests every chunk in a single batch.
///
/// All files are validated before anything is ingested.
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let request_limit = state.settings.upload.max_request_size;
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, request_limit))?
    {
        if field.name() != Some("files") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let contents = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, request_limit))?;
        files.push(UploadedFile {
            name,
            contents: contents.to_vec(),
        });
    }

    validate_files(&files, &state.settings.upload)?;

    let mut chunks = Vec::new();
    for file in &files {
        let collected = state.chunker.collect_from_bytes(&file.name, &file.contents);
        tracing::info!("Chunked {} into {} chunks", file.name, collected.len());
        chunks.extend(collected);
    }

    let chunks_ingested = chunks.len();
    if !chunks.is_empty() {
        state.pipeline.ingest_documents(chunks).await?;
    }

    let count = files.len();
    Ok(Json(UploadResponse {
        ok: true,
        count,
        file_ids: files.into_iter().map(|f| f.name).collect(),
        message: format!("Successfully uploaded {} file(s)", count),
        chunks_ingested,
    }))
}

fn multipart_error(err: MultipartError, request_limit: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!(
            "Upload exceeds the request size limit of {} bytes",
            request_limit
        ))
    } else {
        ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

fn validate_files(files: &[UploadedFile], settings: &UploadSettings) -> Result<(), ApiError> {
    if files.is_empty() {
        return Err(ApiError::BadRequest("No files provided".to_string()));
    }

    for file in files {
        if !settings.is_allowed(&file.name) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported file type: {}",
                file.name
            )));
        }
        if file.contents.len() as u64 > settings.max_file_size {
            return Err(ApiError::BadRequest(format!(
                "{} exceeds the {} size limit",
                file.name,
                format_megabytes(settings.max_file_size)
            )));
        }
    }
    Ok(())
}
