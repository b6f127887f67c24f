//! Interfaces the cache needs from the states it holds.

use std::sync::Arc;

use beacon_primitives::{Buf32, Epoch, Slot};

use crate::errors::StateLoadError;

/// A full chain state computed at a checkpoint.
pub trait CheckpointState: Send + Sync + 'static {
    fn epoch(&self) -> Epoch;

    fn slot(&self) -> Slot;

    /// Root of the latest block at or before `slot`, as recorded by this state.
    ///
    /// Returns `None` if the slot is outside the range the state remembers.
    fn block_root_at_slot(&self, slot: Slot) -> Option<Buf32>;
}

/// Converts states to and from their serialized form.
///
/// Loading is given a seed state so an implementation can reuse structure shared with it instead
/// of building the whole state from scratch. Both calls may be slow and are run on the blocking
/// pool.
pub trait StateLoader<S>: Send + Sync + 'static {
    /// Rebuilds a state from `bytes` using `seed` as a template.
    fn load_state(&self, seed: &S, bytes: &[u8]) -> Result<S, StateLoadError>;

    fn serialize_state(&self, state: &S) -> Vec<u8>;
}

/// Supplies the current head state, used as a reload seed when nothing is resident.
pub type HeadStateFn<S> = Arc<dyn Fn() -> Option<Arc<S>> + Send + Sync>;
