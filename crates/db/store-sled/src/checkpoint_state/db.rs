use beacon_db_types::{traits::CheckpointStateDatabase, DbError, DbResult};
use beacon_primitives::{Checkpoint, Epoch};
use tracing::*;

use super::keys::{decode_key, encode_key, epoch_prefix};
use crate::utils::sled_err;

const TREE_NAME: &str = "CheckpointStateSchema";

/// Checkpoint state blobs stored in a single sled tree.
#[derive(Debug, Clone)]
pub struct CheckpointStateDBSled {
    _db: sled::Db,
    tree: sled::Tree,
}

impl CheckpointStateDBSled {
    pub fn new(db: &sled::Db) -> DbResult<Self> {
        Ok(Self {
            _db: db.clone(),
            tree: db.open_tree(TREE_NAME).map_err(sled_err)?,
        })
    }

    fn decode(raw: &[u8]) -> DbResult<Checkpoint> {
        decode_key(raw).map_err(|e| DbError::CodecError(e.to_string()))
    }
}

impl CheckpointStateDatabase for CheckpointStateDBSled {
    fn put_state_blob(&self, checkpoint: Checkpoint, bytes: Vec<u8>) -> DbResult<bool> {
        let key = encode_key(&checkpoint);
        let res = self
            .tree
            .compare_and_swap(key, None::<&[u8]>, Some(bytes))
            .map_err(sled_err)?;
        if res.is_err() {
            trace!(%checkpoint, "state blob already present, leaving it");
        }
        Ok(res.is_ok())
    }

    fn get_state_blob(&self, checkpoint: Checkpoint) -> DbResult<Option<Vec<u8>>> {
        let key = encode_key(&checkpoint);
        Ok(self
            .tree
            .get(key)
            .map_err(sled_err)?
            .map(|v| v.to_vec()))
    }

    fn del_state_blob(&self, checkpoint: Checkpoint) -> DbResult<bool> {
        let key = encode_key(&checkpoint);
        Ok(self.tree.remove(key).map_err(sled_err)?.is_some())
    }

    fn get_blob_checkpoints(&self) -> DbResult<Vec<Checkpoint>> {
        self.tree
            .iter()
            .keys()
            .map(|k| Self::decode(&k.map_err(sled_err)?))
            .collect()
    }

    fn del_blobs_before_epoch(&self, epoch: Epoch) -> DbResult<Vec<Checkpoint>> {
        let mut batch = sled::Batch::default();
        let mut deleted = Vec::new();
        for key in self.tree.range(..epoch_prefix(epoch)).keys() {
            let key = key.map_err(sled_err)?;
            deleted.push(Self::decode(&key)?);
            batch.remove(key);
        }

        self.tree.apply_batch(batch).map_err(sled_err)?;
        debug!(%epoch, count = deleted.len(), "deleted state blobs before epoch");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use beacon_db_tests::checkpoint_state_db_tests;

    use crate::test_utils::get_test_checkpoint_state_db;

    checkpoint_state_db_tests!(get_test_checkpoint_state_db());
}
