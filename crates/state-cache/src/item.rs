use std::{fmt, sync::Arc};

use beacon_primitives::{Buf32, Slot};
use beacon_storage::PersistedHandle;
use serde::{Deserialize, Serialize};

/// A cache slot holds either the state itself or the handle it was persisted under, never both.
#[derive(Debug)]
pub(crate) enum CacheItem<S> {
    State(Arc<S>),
    Persisted(PersistedHandle),
}

impl<S> CacheItem<S> {
    pub(crate) fn as_state(&self) -> Option<&Arc<S>> {
        match self {
            Self::State(state) => Some(state),
            Self::Persisted(_) => None,
        }
    }

    pub(crate) fn as_persisted(&self) -> Option<&PersistedHandle> {
        match self {
            Self::State(_) => None,
            Self::Persisted(handle) => Some(handle),
        }
    }
}

/// Result of [`CheckpointStateCache::get_state_or_bytes`].
///
/// [`CheckpointStateCache::get_state_or_bytes`]: crate::CheckpointStateCache::get_state_or_bytes
#[derive(Debug)]
pub enum StateOrBytes<S> {
    State(Arc<S>),
    Bytes(Vec<u8>),
}

impl<S> StateOrBytes<S> {
    pub fn state(&self) -> Option<&Arc<S>> {
        match self {
            Self::State(state) => Some(state),
            Self::Bytes(_) => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::State(_) => None,
            Self::Bytes(bytes) => Some(bytes),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ReadStats {
    pub(crate) reads: u64,
    pub(crate) last_read_ms: u64,
}

/// Debug view of one cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCacheItem {
    /// First slot of the checkpoint's epoch.
    pub slot: Slot,
    pub root: Buf32,
    pub reads: u64,
    /// Unix time of the last read in milliseconds, 0 if never read.
    pub last_read_ms: u64,
    pub checkpoint_state: bool,
    /// Handle the state is persisted under, if it isn't resident.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Why a persisted state was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RemoveReason {
    PruneFinalized,
    Reload,
    StateUpdate,
    Delete,
}

impl RemoveReason {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::PruneFinalized => "prune_finalized",
            Self::Reload => "reload",
            Self::StateUpdate => "state_update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for RemoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json() {
        let item = StateCacheItem {
            slot: 64,
            root: Buf32::zero(),
            reads: 3,
            last_read_ms: 1_700_000_000_000,
            checkpoint_state: true,
            file_path: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["slot"], 64);
        assert_eq!(json["checkpointState"], true);
        assert!(json.get("filePath").is_none());
        assert_eq!(json["root"], Buf32::zero().to_hex());
    }
}
