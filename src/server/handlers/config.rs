use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Non-sensitive summary of the running configuration.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub vector_store_type: &'static str,
    pub max_upload_size: String,
    pub api_host: String,
    pub api_port: u16,
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let settings = &state.settings;
    Json(ConfigResponse {
        embedding_model: settings.embedder.model_label(),
        embedding_dim: settings.rag.embedding_dim,
        vector_store_type: "in_memory_flat_ip",
        max_upload_size: format_megabytes(settings.upload.max_file_size),
        api_host: settings.server.host.clone(),
        api_port: settings.server.port,
    })
}

/// Formats a byte count the way upload limits are quoted to users ("5MB").
pub fn format_megabytes(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    }
}
