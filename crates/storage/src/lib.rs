//! Storage for checkpoint states evicted from the state cache.

mod config;
mod exec;
pub mod ops;
pub mod persistence;

pub use config::{create_state_persistence, PersistenceConfig};
pub use exec::DbRecv;
#[cfg(feature = "test-utils")]
pub use persistence::MockStatePersistence;
pub use persistence::{
    DbStatePersistence, FileStatePersistence, PersistedHandle, StatePersistence,
    DEFAULT_CHECKPOINT_STATES_DIR,
};
