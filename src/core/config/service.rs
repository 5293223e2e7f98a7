use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::settings::Settings;
use super::validation::validate_config;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    /// `RAGBOT_CONFIG_PATH` wins; otherwise the first existing candidate,
    /// falling back to the config dir.
    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = env::var_os("RAGBOT_CONFIG_PATH").filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }

        let [primary, fallback] = self.paths.config_candidates();
        if !primary.exists() && fallback.exists() {
            return fallback;
        }
        primary
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Public config deep-merged with the secrets file.
    pub fn load_config(&self) -> Result<Value, ApiError> {
        let public_config = load_yaml_file(&self.config_path())?;
        let secrets_config = load_yaml_file(&self.secrets_path())?;
        Ok(deep_merge(&public_config, &secrets_config))
    }

    /// Loads, validates and types the configuration. `PORT` overrides
    /// `server.port`.
    pub fn load_settings(&self) -> Result<Settings, ApiError> {
        let config = self.load_config()?;
        validate_config(&config)?;
        let mut settings = Settings::from_value(&config)?;

        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
            settings.server.port = port;
        }

        Ok(settings)
    }
}

/// Missing files read as an empty mapping; unreadable or malformed ones are
/// configuration errors.
fn load_yaml_file(path: &Path) -> Result<Value, ApiError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|err| {
        ApiError::internal(format!("Failed to read {}: {}", path.display(), err))
    })?;
    if contents.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let value = serde_yaml::from_str::<Value>(&contents).map_err(|err| {
        ApiError::BadRequest(format!("Failed to parse {}: {}", path.display(), err))
    })?;

    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(ApiError::BadRequest(format!(
            "Invalid config in {}: expected a mapping at the root",
            path.display()
        ))),
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}
