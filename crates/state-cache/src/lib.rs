//! Cache of checkpoint states that keeps recent epochs in memory and moves older ones to
//! persistence.

mod cache;
pub mod config;
mod epochs;
pub mod errors;
mod item;
pub mod metrics;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod traits;

pub use cache::CheckpointStateCache;
pub use config::{CheckpointCacheConfig, DEFAULT_MAX_EPOCHS_IN_MEMORY};
pub use errors::{CacheError, StateLoadError};
pub use item::{StateCacheItem, StateOrBytes};
pub use traits::{CheckpointState, HeadStateFn, StateLoader};
