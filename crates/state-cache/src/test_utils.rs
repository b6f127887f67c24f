//! A small state type and loader for exercising the cache.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use beacon_primitives::{
    epoch::{compute_epoch_at_slot, compute_start_slot_at_epoch},
    Buf32, Epoch, Slot,
};
use borsh::{BorshDeserialize, BorshSerialize};

use crate::{errors::StateLoadError, CheckpointState, StateLoader};

/// Minimal chain state: a slot, a block root history and an opaque body.
///
/// States only reload against seeds with the same `layout`, mimicking a loader that needs a
/// structurally compatible seed.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TestState {
    slot: Slot,
    layout: u32,
    block_roots: BTreeMap<Slot, Buf32>,
    body: Vec<u8>,
}

impl TestState {
    pub fn new(slot: Slot) -> Self {
        Self {
            slot,
            layout: 0,
            block_roots: BTreeMap::new(),
            body: slot.to_le_bytes().to_vec(),
        }
    }

    /// State at the first slot of `epoch`.
    pub fn at_epoch(epoch: Epoch) -> Self {
        Self::new(compute_start_slot_at_epoch(epoch))
    }

    pub fn with_block_root(mut self, slot: Slot, root: Buf32) -> Self {
        self.block_roots.insert(slot, root);
        self
    }

    pub fn with_layout(mut self, layout: u32) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn layout(&self) -> u32 {
        self.layout
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).expect("test: serialize state")
    }
}

impl CheckpointState for TestState {
    fn epoch(&self) -> Epoch {
        compute_epoch_at_slot(self.slot)
    }

    fn slot(&self) -> Slot {
        self.slot
    }

    fn block_root_at_slot(&self, slot: Slot) -> Option<Buf32> {
        self.block_roots.get(&slot).copied()
    }
}

/// Borsh loader for [`TestState`] that counts its calls and can be told to fail.
#[derive(Debug, Default)]
pub struct TestStateLoader {
    loads: AtomicUsize,
    serializations: AtomicUsize,
    fail_loads: AtomicBool,
}

impl TestStateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn serializations(&self) -> usize {
        self.serializations.load(Ordering::SeqCst)
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

impl StateLoader<TestState> for TestStateLoader {
    fn load_state(&self, seed: &TestState, bytes: &[u8]) -> Result<TestState, StateLoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StateLoadError::Other("injected load failure".to_owned()));
        }

        let state = TestState::try_from_slice(bytes)
            .map_err(|e| StateLoadError::Malformed(e.to_string()))?;
        if state.layout != seed.layout {
            return Err(StateLoadError::IncompatibleSeed(format!(
                "seed layout {} != state layout {}",
                seed.layout, state.layout
            )));
        }
        Ok(state)
    }

    fn serialize_state(&self, state: &TestState) -> Vec<u8> {
        self.serializations.fetch_add(1, Ordering::SeqCst);
        state.to_bytes()
    }
}
