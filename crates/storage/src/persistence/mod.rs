//! Durable storage for checkpoint states evicted from memory.

mod db;
mod file;

use std::fmt;

use async_trait::async_trait;
use beacon_db_types::DbResult;
use beacon_primitives::{Checkpoint, CheckpointKey, Epoch};
use serde::{Deserialize, Serialize};

pub use self::{
    db::DbStatePersistence,
    file::{FileStatePersistence, DEFAULT_CHECKPOINT_STATES_DIR},
};

/// Opaque identifier for a persisted state, returned by [`StatePersistence::write`].
///
/// Only the backend that produced a handle knows how to interpret it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PersistedHandle(String);

impl PersistedHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CheckpointKey> for PersistedHandle {
    fn from(value: CheckpointKey) -> Self {
        Self(value.as_str().to_owned())
    }
}

/// Stores serialized checkpoint states.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait StatePersistence: Send + Sync + 'static {
    /// Writes the serialized state of a checkpoint, keeping any copy that is already stored.
    async fn write(&self, checkpoint: Checkpoint, bytes: Vec<u8>) -> DbResult<PersistedHandle>;

    /// Reads back a state written earlier, `None` if it's gone.
    async fn read(&self, handle: &PersistedHandle) -> DbResult<Option<Vec<u8>>>;

    /// Removes a persisted state. Removing something that isn't there is not an error.
    async fn remove(&self, handle: &PersistedHandle) -> DbResult<()>;

    /// Removes every persisted state with an epoch below `epoch`, returning the handles removed.
    ///
    /// This catches blobs orphaned by a crash between reloading a state and removing its blob.
    async fn sweep_before(&self, epoch: Epoch) -> DbResult<Vec<PersistedHandle>>;
}
