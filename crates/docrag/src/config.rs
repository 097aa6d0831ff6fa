//! Configuration handling for the docrag CLI.

use directories::ProjectDirs;
use docrag_embed::EmbeddingBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingSettings,

    /// Vector index configuration
    #[serde(default)]
    pub index: IndexSettings,

    /// Query configuration
    #[serde(default)]
    pub query: QuerySettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Render the current configuration as TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Embedding-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Which backend to use; fixed for the lifetime of an index.
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Remote model name
    #[serde(default = "default_remote_model")]
    pub model: String,

    /// Remote API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the remote API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Remote request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max concurrent embedding jobs
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_remote_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "DOCRAG_EMBED_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_remote_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Chunking-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingSettings {
    /// Window size in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_max_chars() -> usize {
    2000
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexSettings {
    /// Database path; defaults to `<data dir>/index.lance`
    pub db_path: Option<PathBuf>,
}

/// Query-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Default number of chunks returned
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Upper bound a caller can request
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
}

fn default_top_k() -> usize {
    docrag_query::DEFAULT_TOP_K
}

fn default_max_top_k() -> usize {
    100
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Get the data directory for docrag.
pub fn data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DOCRAG_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "docrag").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the config directory for docrag.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DOCRAG_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "docrag").map(|dirs| dirs.config_dir().to_path_buf())
}
