//! Backend-agnostic conformance tests for the database traits.
//!
//! Each backend instantiates the test macros with an expression that builds a fresh database.

pub mod checkpoint_state_tests;

#[cfg(test)]
mod stub_tests {
    use beacon_db_types::stubs::StubCheckpointStateDb;

    use crate::checkpoint_state_db_tests;

    checkpoint_state_db_tests!(StubCheckpointStateDb::new());
}
