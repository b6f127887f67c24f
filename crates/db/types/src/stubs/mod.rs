mod checkpoint_state;

pub use checkpoint_state::StubCheckpointStateDb;
