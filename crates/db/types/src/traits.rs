//! Trait definitions for low level database interfaces.

use beacon_primitives::{Checkpoint, Epoch};

use crate::DbResult;

/// Stores serialized checkpoint states, keyed by checkpoint.
///
/// Blobs are opaque to the database. Implementations must tolerate concurrent writes for
/// distinct checkpoints.
pub trait CheckpointStateDatabase: Send + Sync + 'static {
    /// Stores the serialized state for a checkpoint if there isn't one already.
    ///
    /// Returns `false` if an entry already existed and was left untouched.
    fn put_state_blob(&self, checkpoint: Checkpoint, bytes: Vec<u8>) -> DbResult<bool>;

    /// Gets the serialized state for a checkpoint, if present.
    fn get_state_blob(&self, checkpoint: Checkpoint) -> DbResult<Option<Vec<u8>>>;

    /// Deletes the serialized state for a checkpoint.
    ///
    /// Returns whether there was an entry to delete.
    fn del_state_blob(&self, checkpoint: Checkpoint) -> DbResult<bool>;

    /// Lists every checkpoint with a stored blob, ordered by epoch.
    fn get_blob_checkpoints(&self) -> DbResult<Vec<Checkpoint>>;

    /// Deletes every blob whose epoch is strictly below `epoch`, returning what was deleted.
    fn del_blobs_before_epoch(&self, epoch: Epoch) -> DbResult<Vec<Checkpoint>>;
}
