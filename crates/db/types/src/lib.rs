//! Database types and traits for the node.

pub mod errors;
#[cfg(feature = "stubs")]
pub mod stubs;
pub mod traits;

pub use errors::{DbError, DbResult};
