//! Persistence backend configuration.

use std::{path::PathBuf, sync::Arc};

use beacon_db_store_sled::{open_sled_database, CheckpointStateDBSled, SLED_NAME};
use serde::{Deserialize, Serialize};
use threadpool::ThreadPool;
use tracing::*;

use crate::persistence::{
    DbStatePersistence, FileStatePersistence, StatePersistence, DEFAULT_CHECKPOINT_STATES_DIR,
};

fn default_state_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CHECKPOINT_STATES_DIR)
}

/// Where evicted checkpoint states go.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum PersistenceConfig {
    /// Blobs in a sled tree under `datadir`.
    Sled { datadir: PathBuf },

    /// One file per state in `dir`.
    File {
        #[serde(default = "default_state_dir")]
        dir: PathBuf,
    },
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self::File {
            dir: default_state_dir(),
        }
    }
}

/// Opens the configured persistence backend.
///
/// Database work for the sled backend is dispatched onto `pool`.
pub async fn create_state_persistence(
    config: &PersistenceConfig,
    pool: ThreadPool,
) -> anyhow::Result<Arc<dyn StatePersistence>> {
    match config {
        PersistenceConfig::Sled { datadir } => {
            info!(datadir = %datadir.display(), "opening sled state persistence");
            let sled_db = open_sled_database(datadir, SLED_NAME)?;
            let db = Arc::new(CheckpointStateDBSled::new(&sled_db)?);
            Ok(Arc::new(DbStatePersistence::new(pool, db)))
        }
        PersistenceConfig::File { dir } => {
            info!(dir = %dir.display(), "opening file state persistence");
            Ok(Arc::new(FileStatePersistence::open(dir.clone()).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use beacon_test_utils::make_checkpoint;

    use super::*;

    #[test]
    fn test_parse_sled_config() {
        let config_string = r#"
            backend = "sled"
            datadir = "/var/lib/beacon"
        "#;
        let config: PersistenceConfig = toml::from_str(config_string).unwrap();
        assert_eq!(
            config,
            PersistenceConfig::Sled {
                datadir: PathBuf::from("/var/lib/beacon")
            }
        );
    }

    #[test]
    fn test_parse_file_config_default_dir() {
        let config: PersistenceConfig = toml::from_str(r#"backend = "file""#).unwrap();
        assert_eq!(config, PersistenceConfig::default());
    }

    #[test]
    fn test_parse_unknown_backend() {
        let res = toml::from_str::<PersistenceConfig>(r#"backend = "rocksdb""#);
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_create_both_backends() {
        let tmp = tempfile::tempdir().unwrap();
        let configs = [
            PersistenceConfig::Sled {
                datadir: tmp.path().join("data"),
            },
            PersistenceConfig::File {
                dir: tmp.path().join("states"),
            },
        ];

        for config in &configs {
            let persistence = create_state_persistence(config, ThreadPool::new(1))
                .await
                .expect("test: open backend");
            let handle = persistence
                .write(make_checkpoint(1, 1), vec![4, 2])
                .await
                .expect("test: write");
            assert_eq!(persistence.read(&handle).await.unwrap(), Some(vec![4, 2]));
        }
    }
}
