use beacon_storage::PersistenceConfig;
use serde::{Deserialize, Serialize};

/// Number of epochs whose checkpoint states are kept in memory by default.
pub const DEFAULT_MAX_EPOCHS_IN_MEMORY: usize = 2;

fn default_max_epochs_in_memory() -> usize {
    DEFAULT_MAX_EPOCHS_IN_MEMORY
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointCacheConfig {
    /// Epochs allowed to keep resident states before older ones are moved to persistence.
    #[serde(default = "default_max_epochs_in_memory")]
    pub max_epochs_in_memory: usize,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for CheckpointCacheConfig {
    fn default() -> Self {
        Self {
            max_epochs_in_memory: DEFAULT_MAX_EPOCHS_IN_MEMORY,
            persistence: PersistenceConfig::default(),
        }
    }
}

impl CheckpointCacheConfig {
    pub fn with_max_epochs_in_memory(mut self, max: usize) -> Self {
        self.max_epochs_in_memory = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CheckpointCacheConfig = toml::from_str("").unwrap();
        assert_eq!(config, CheckpointCacheConfig::default());
        assert_eq!(config.max_epochs_in_memory, 2);
    }

    #[test]
    fn test_full_config() {
        let config_string = r#"
            max_epochs_in_memory = 0

            [persistence]
            backend = "sled"
            datadir = "/tmp/beacon"
        "#;
        let config: CheckpointCacheConfig = toml::from_str(config_string).unwrap();
        assert_eq!(config.max_epochs_in_memory, 0);
        assert_eq!(
            config.persistence,
            PersistenceConfig::Sled {
                datadir: PathBuf::from("/tmp/beacon")
            }
        );
    }

    #[test]
    fn test_negative_max_epochs_rejected() {
        let res = toml::from_str::<CheckpointCacheConfig>("max_epochs_in_memory = -1");
        assert!(res.is_err());
    }
}
