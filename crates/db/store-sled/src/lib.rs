//! Sled store for serialized checkpoint states.

pub mod checkpoint_state;
mod init;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
mod utils;

pub use checkpoint_state::CheckpointStateDBSled;
pub use init::open_sled_database;

pub const SLED_NAME: &str = "beacon-node";
