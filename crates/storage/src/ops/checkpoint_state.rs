//! Checkpoint state blob operations interface.

use beacon_db_types::traits::*;
use beacon_primitives::{Checkpoint, Epoch};

use crate::exec::*;

inst_ops_simple! {
    (<D: CheckpointStateDatabase> => CheckpointStateOps) {
        put_state_blob(checkpoint: Checkpoint, bytes: Vec<u8>) => bool;
        get_state_blob(checkpoint: Checkpoint) => Option<Vec<u8>>;
        del_state_blob(checkpoint: Checkpoint) => bool;
        get_blob_checkpoints() => Vec<Checkpoint>;
        del_blobs_before_epoch(epoch: Epoch) => Vec<Checkpoint>;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use beacon_db_types::stubs::StubCheckpointStateDb;
    use beacon_test_utils::make_checkpoint;
    use threadpool::ThreadPool;

    use super::*;

    fn make_ops() -> CheckpointStateOps {
        Context::new(Arc::new(StubCheckpointStateDb::new())).into_ops(ThreadPool::new(2))
    }

    #[tokio::test]
    async fn test_async_and_blocking_agree() {
        let ops = make_ops();
        let cp = make_checkpoint(4, 2);

        assert!(ops.put_state_blob_async(cp, vec![7]).await.unwrap());
        assert_eq!(ops.get_state_blob_blocking(cp).unwrap(), Some(vec![7]));
        assert_eq!(ops.get_blob_checkpoints_async().await.unwrap(), vec![cp]);
    }

    #[tokio::test]
    async fn test_chan() {
        let ops = make_ops();
        let cp = make_checkpoint(4, 2);
        ops.put_state_blob_blocking(cp, vec![1]).unwrap();

        let rx = ops.del_state_blob_chan(cp);
        assert!(rx.await.expect("test: recv").unwrap());
        assert!(ops.get_state_blob_async(cp).await.unwrap().is_none());
    }
}
