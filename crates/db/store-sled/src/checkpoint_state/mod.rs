mod db;
mod keys;

pub use db::CheckpointStateDBSled;
