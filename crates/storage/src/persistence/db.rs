use std::sync::Arc;

use async_trait::async_trait;
use beacon_db_types::{traits::CheckpointStateDatabase, DbError, DbResult};
use beacon_primitives::{Checkpoint, Epoch};
use threadpool::ThreadPool;
use tracing::*;

use super::{PersistedHandle, StatePersistence};
use crate::ops::checkpoint_state::{CheckpointStateOps, Context};

/// Persists states into a [`CheckpointStateDatabase`], using the checkpoint key as the handle.
#[derive(Debug)]
pub struct DbStatePersistence {
    ops: CheckpointStateOps,
}

impl DbStatePersistence {
    pub fn new(pool: ThreadPool, db: Arc<impl CheckpointStateDatabase>) -> Self {
        let ops = Context::new(db).into_ops(pool);
        Self { ops }
    }

    fn handle_checkpoint(handle: &PersistedHandle) -> DbResult<Checkpoint> {
        handle
            .as_str()
            .parse::<Checkpoint>()
            .map_err(|e| DbError::CodecError(format!("bad state handle {handle}: {e}")))
    }
}

#[async_trait]
impl StatePersistence for DbStatePersistence {
    async fn write(&self, checkpoint: Checkpoint, bytes: Vec<u8>) -> DbResult<PersistedHandle> {
        let inserted = self.ops.put_state_blob_async(checkpoint, bytes).await?;
        if !inserted {
            debug!(%checkpoint, "state blob already stored");
        }
        Ok(checkpoint.to_key().into())
    }

    async fn read(&self, handle: &PersistedHandle) -> DbResult<Option<Vec<u8>>> {
        let checkpoint = Self::handle_checkpoint(handle)?;
        self.ops.get_state_blob_async(checkpoint).await
    }

    async fn remove(&self, handle: &PersistedHandle) -> DbResult<()> {
        let checkpoint = Self::handle_checkpoint(handle)?;
        if !self.ops.del_state_blob_async(checkpoint).await? {
            trace!(%handle, "no state blob to remove");
        }
        Ok(())
    }

    async fn sweep_before(&self, epoch: Epoch) -> DbResult<Vec<PersistedHandle>> {
        let removed = self.ops.del_blobs_before_epoch_async(epoch).await?;
        Ok(removed.iter().map(|cp| cp.to_key().into()).collect())
    }
}
