//! Epoch and slot arithmetic.

/// Consensus slot number.
pub type Slot = u64;

/// Consensus epoch number.
pub type Epoch = u64;

/// Number of slots in one epoch.
pub const SLOTS_PER_EPOCH: u64 = 32;

/// Returns the first slot of `epoch`.
pub const fn compute_start_slot_at_epoch(epoch: Epoch) -> Slot {
    epoch * SLOTS_PER_EPOCH
}

/// Returns the epoch containing `slot`.
pub const fn compute_epoch_at_slot(slot: Slot) -> Epoch {
    slot / SLOTS_PER_EPOCH
}

/// Returns the last slot of the epoch before `epoch`, or `None` for genesis.
pub const fn last_slot_of_previous_epoch(epoch: Epoch) -> Option<Slot> {
    compute_start_slot_at_epoch(epoch).checked_sub(1)
}
