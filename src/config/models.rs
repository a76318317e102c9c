use serde::{Deserialize, Serialize};

use crate::models::BackendConnection;

use super::defaults::*;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Configuration {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub documents: DocumentsConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogConfig {
    #[serde(default = "log_level")]
    pub level: Option<String>,

    #[serde(default)]
    pub filters: Option<Vec<LogFilter>>,

    /// When unset, logs go to stderr.
    #[serde(default)]
    pub file: Option<LogFile>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: log_level(),
            filters: None,
            file: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogFilter {
    #[serde(default)]
    pub module: Option<String>,

    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogFile {
    pub path: String,

    #[serde(default)]
    pub append: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum StorageConfig {
    #[serde(rename = "sqlite")]
    Sqlite(SqliteStorage),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite(SqliteStorage::default())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SqliteStorage {
    /// When unset, the log lives in memory for the lifetime of the process.
    pub path: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BackendConfig {
    #[serde(default)]
    pub default_model: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u16>,

    #[serde(default)]
    pub connections: Vec<BackendConnection>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AgentConfig {
    #[serde(default = "history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_limit: history_limit(),
            system_prompt: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DocumentsConfig {
    #[serde(default = "document_bucket")]
    pub bucket: String,

    #[serde(default = "embeddings_table")]
    pub table: String,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            bucket: document_bucket(),
            table: embeddings_table(),
        }
    }
}
