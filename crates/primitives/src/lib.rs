//! Collection of generic data types shared across the node.

pub mod buf;
pub mod checkpoint;
pub mod epoch;

pub use buf::{Buf32, BufParseError};
pub use checkpoint::{Checkpoint, CheckpointKey, CheckpointKeyError};
pub use epoch::{Epoch, Slot, SLOTS_PER_EPOCH};
