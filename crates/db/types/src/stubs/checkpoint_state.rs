use std::collections::BTreeMap;

use beacon_primitives::{Checkpoint, Epoch};
use parking_lot::Mutex;

use crate::{traits::CheckpointStateDatabase, DbResult};

/// In-memory checkpoint state store, used in tests and for running without a data dir.
///
/// Entries are kept in a `BTreeMap` so iteration order matches the epoch order of the sled
/// store.
#[derive(Debug, Default)]
pub struct StubCheckpointStateDb {
    blobs: Mutex<BTreeMap<Checkpoint, Vec<u8>>>,
}

impl StubCheckpointStateDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

impl CheckpointStateDatabase for StubCheckpointStateDb {
    fn put_state_blob(&self, checkpoint: Checkpoint, bytes: Vec<u8>) -> DbResult<bool> {
        let mut tbl = self.blobs.lock();
        if tbl.contains_key(&checkpoint) {
            return Ok(false);
        }
        tbl.insert(checkpoint, bytes);
        Ok(true)
    }

    fn get_state_blob(&self, checkpoint: Checkpoint) -> DbResult<Option<Vec<u8>>> {
        Ok(self.blobs.lock().get(&checkpoint).cloned())
    }

    fn del_state_blob(&self, checkpoint: Checkpoint) -> DbResult<bool> {
        Ok(self.blobs.lock().remove(&checkpoint).is_some())
    }

    fn get_blob_checkpoints(&self) -> DbResult<Vec<Checkpoint>> {
        Ok(self.blobs.lock().keys().copied().collect())
    }

    fn del_blobs_before_epoch(&self, epoch: Epoch) -> DbResult<Vec<Checkpoint>> {
        let mut tbl = self.blobs.lock();
        let doomed: Vec<Checkpoint> = tbl
            .keys()
            .take_while(|cp| cp.epoch() < epoch)
            .copied()
            .collect();
        for cp in &doomed {
            tbl.remove(cp);
        }
        Ok(doomed)
    }
}
