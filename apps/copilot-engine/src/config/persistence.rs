//! Audit log and execution ledger storage.

use serde::{Deserialize, Serialize};

/// Storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    /// Process memory. Lost on restart.
    Memory,
    /// JSON files under `data_dir`.
    #[default]
    File,
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Storage backend.
    #[serde(default)]
    pub backend: PersistenceBackend,
    /// Directory for the file backend.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "./data/copilot".to_string()
}
