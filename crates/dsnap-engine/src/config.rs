use std::path::Path;

use dsnap_dom::MutationLogConfig;
use dsnap_store::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Configuration for a [`SnapshotEngine`](crate::SnapshotEngine).
///
/// Every key is optional in TOML; missing keys take their defaults.
///
/// ```toml
/// max_snapshots = 20
/// default_label_prefix = "Capture"
///
/// [mutation_log]
/// max_records = 2000
/// retain_records = 1000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of snapshots kept; the oldest is evicted beyond this.
    pub max_snapshots: usize,
    /// Prefix of generated labels, followed by the snapshot sequence number.
    pub default_label_prefix: String,
    /// Bounds for documents tracked through the engine.
    pub mutation_log: MutationLogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_snapshots: DEFAULT_CAPACITY,
            default_label_prefix: "Snapshot".into(),
            mutation_log: MutationLogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(input: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.max_snapshots == 0 {
            return Err(EngineError::Config(
                "max_snapshots must be at least 1".into(),
            ));
        }
        if self.mutation_log.retain_records > self.mutation_log.max_records {
            return Err(EngineError::Config(format!(
                "mutation_log.retain_records ({}) exceeds max_records ({})",
                self.mutation_log.retain_records, self.mutation_log.max_records
            )));
        }
        Ok(())
    }
}
