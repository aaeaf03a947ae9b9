use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic configuration ID (BLAKE3 of the canonical strategy config).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigId(pub String);

impl ConfigId {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic dataset hash (content hash of the loaded bar sequence).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic run ID (config + dataset).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub config_id: ConfigId,
    pub dataset_hash: DatasetHash,
}

impl RunId {
    pub fn new(config_id: ConfigId, dataset_hash: DatasetHash) -> Self {
        Self {
            config_id,
            dataset_hash,
        }
    }

    /// Stable run hash over the canonical JSON of both components.
    pub fn hash(&self) -> String {
        use serde_json::json;

        let canonical = json!({
            "config_id": &self.config_id.0,
            "dataset_hash": &self.dataset_hash.0,
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }

    /// First 12 hex characters of [`RunId::hash`], used for directory names.
    pub fn short(&self) -> String {
        self.hash()[..12].to_string()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.config_id, self.dataset_hash)
    }
}

/// Sequential ID of a raw signal, assigned by the trigger in bar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalEventId(pub u64);

impl fmt::Display for SignalEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig-{}", self.0)
    }
}
