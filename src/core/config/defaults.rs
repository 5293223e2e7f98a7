pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_EMBEDDING_DIM: usize = 384;
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MAX_SOURCES: usize = 10;

pub const DEFAULT_EMBEDDER_PROVIDER: &str = "hash";
pub const DEFAULT_EMBEDDER_URL: &str = "http://localhost:8080/embedding";
pub const DEFAULT_EMBEDDER_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_REQUEST_SIZE: u64 = 32 * 1024 * 1024;
pub const DEFAULT_CHUNK_SIZE: usize = 300;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const EMBEDDER_PROVIDERS: [&str; 2] = ["hash", "http"];

pub fn default_allowed_extensions() -> Vec<String> {
    [".pdf", ".txt", ".md"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

pub fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
