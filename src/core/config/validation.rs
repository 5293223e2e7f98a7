use serde_json::{Map, Value};

use super::defaults::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, EMBEDDER_PROVIDERS};
use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65_535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
        validate_u64_field(
            server,
            "server.request_timeout_secs",
            "request_timeout_secs",
            1,
            86_400,
        )?;
    }

    if let Some(rag) = expect_optional_object(root, "rag")? {
        validate_u64_field(rag, "rag.embedding_dim", "embedding_dim", 1, 65_536)?;
        validate_u64_field(rag, "rag.top_k", "top_k", 1, 1_000)?;
        validate_u64_field(rag, "rag.max_sources", "max_sources", 1, 1_000)?;
    }

    if let Some(embedder) = expect_optional_object(root, "embedder")? {
        validate_optional_string_field(embedder, "embedder.provider", "provider")?;
        if let Some(provider) = embedder.get("provider").and_then(|v| v.as_str()) {
            if !EMBEDDER_PROVIDERS.contains(&provider) {
                return Err(ApiError::BadRequest(format!(
                    "Invalid config at 'embedder.provider': expected one of {}",
                    EMBEDDER_PROVIDERS.join(", ")
                )));
            }
            if provider == "http" {
                validate_required_string_field(embedder, "embedder.url", "url")?;
            }
        }
        validate_optional_string_field(embedder, "embedder.url", "url")?;
        validate_u64_field(embedder, "embedder.timeout_secs", "timeout_secs", 1, 86_400)?;
        validate_optional_string_field(embedder, "embedder.model", "model")?;
        validate_optional_string_field(embedder, "embedder.api_key", "api_key")?;
    }

    if let Some(upload) = expect_optional_object(root, "upload")? {
        validate_u64_field(
            upload,
            "upload.max_file_size",
            "max_file_size",
            1,
            1_073_741_824,
        )?;
        validate_u64_field(
            upload,
            "upload.max_request_size",
            "max_request_size",
            1,
            1_073_741_824,
        )?;
        validate_string_array_field(upload, "upload.allowed_extensions", "allowed_extensions")?;
        validate_u64_field(upload, "upload.chunk_size", "chunk_size", 1, 100_000)?;
        validate_u64_field(upload, "upload.chunk_overlap", "chunk_overlap", 0, 100_000)?;

        let chunk_size = upload
            .get("chunk_size")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_CHUNK_SIZE as u64);
        let chunk_overlap = upload
            .get("chunk_overlap")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_CHUNK_OVERLAP as u64);
        if chunk_overlap >= chunk_size {
            return Err(ApiError::BadRequest(
                "Invalid config at 'upload.chunk_overlap': must be smaller than chunk_size"
                    .to_string(),
            ));
        }
    }

    if let Some(logging) = expect_optional_object(root, "logging")? {
        validate_optional_string_field(logging, "logging.level", "level")?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

/// A key left empty in YAML reads as `null` and counts as unset.
fn present<'a>(section: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    section.get(key).filter(|value| !value.is_null())
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = present(section, key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_required_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let value = present(section, key).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid config at '{}': value is required", path))
    })?;
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    match present(section, key) {
        Some(value) if value.as_str().is_none() => Err(config_type_error(path, "string")),
        _ => Ok(()),
    }
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = present(section, key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
