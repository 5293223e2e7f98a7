//! Filesystem locations used by the service.
//!
//! Everything is resolved at runtime from `RAGBOT_*` variables, the working
//! directory and the user's platform data directory.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.yml";
const SECRETS_FILE: &str = "secrets.yaml";
const LOG_SUBDIR: &str = "logs";

#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory searched first for `config.yml`.
    pub config_dir: PathBuf,
    /// Per-user directory holding secrets, logs and a fallback config.
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub secrets_path: PathBuf,
}

impl AppPaths {
    /// `RAGBOT_CONFIG_DIR` (default: working directory) and
    /// `RAGBOT_DATA_DIR` (default: platform data directory).
    pub fn from_env() -> Self {
        let config_dir = env_dir("RAGBOT_CONFIG_DIR")
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let data_dir = env_dir("RAGBOT_DATA_DIR").unwrap_or_else(platform_data_dir);
        Self::with_dirs(config_dir, data_dir)
    }

    pub fn with_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            log_dir: data_dir.join(LOG_SUBDIR),
            secrets_path: data_dir.join(SECRETS_FILE),
            config_dir,
            data_dir,
        }
    }

    /// Config file candidates in lookup order.
    pub fn config_candidates(&self) -> [PathBuf; 2] {
        [
            self.config_dir.join(CONFIG_FILE),
            self.data_dir.join(CONFIG_FILE),
        ]
    }

    /// Creates the data and log directories.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.log_dir)
    }
}

fn env_dir(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn platform_data_dir() -> PathBuf {
    let home = env_dir("HOME").or_else(|| env_dir("USERPROFILE"));
    let dir = match env::consts::OS {
        "windows" => env_dir("LOCALAPPDATA").or(home).map(|base| base.join("Ragbot")),
        "macos" => home.map(|base| base.join("Library/Application Support/Ragbot")),
        _ => env_dir("XDG_DATA_HOME")
            .or_else(|| home.map(|base| base.join(".local/share")))
            .map(|base| base.join("ragbot")),
    };
    dir.unwrap_or_else(|| PathBuf::from(".ragbot"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_under_data_dir() {
        let paths = AppPaths::with_dirs(PathBuf::from("/etc/ragbot"), PathBuf::from("/var/ragbot"));
        assert_eq!(paths.log_dir, PathBuf::from("/var/ragbot/logs"));
        assert_eq!(paths.secrets_path, PathBuf::from("/var/ragbot/secrets.yaml"));
        assert_eq!(
            paths.config_candidates(),
            [
                PathBuf::from("/etc/ragbot/config.yml"),
                PathBuf::from("/var/ragbot/config.yml"),
            ]
        );
    }

    #[test]
    fn ensure_dirs_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let paths = AppPaths::with_dirs(dir.path().to_path_buf(), data_dir.clone());

        assert!(!data_dir.exists());
        paths.ensure_dirs().unwrap();
        assert!(paths.log_dir.is_dir());
    }
}
