//! Database operation interfaces.

pub mod checkpoint_state;
