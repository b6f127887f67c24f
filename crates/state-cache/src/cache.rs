//! Checkpoint state cache with eviction to persistence.
//!
//! States for the most recent epochs stay in memory. Older epochs are moved to a
//! [`StatePersistence`] backend by [`CheckpointStateCache::prune_from_memory`] and rebuilt on
//! demand from the closest resident state. Finality drops everything below the finalized epoch,
//! both in memory and persisted.

use std::{
    collections::{BTreeMap, HashMap},
    fmt, mem,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use beacon_primitives::{
    epoch::{compute_start_slot_at_epoch, last_slot_of_previous_epoch},
    Buf32, Checkpoint, CheckpointKey, CheckpointKeyError, Epoch,
};
use beacon_storage::{create_state_persistence, PersistedHandle, StatePersistence};
use parking_lot::Mutex;
use threadpool::ThreadPool;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::*;

use crate::{
    config::CheckpointCacheConfig,
    epochs::EpochQueue,
    errors::CacheError,
    item::{CacheItem, ReadStats, RemoveReason, StateCacheItem, StateOrBytes},
    metrics,
    traits::{CheckpointState, HeadStateFn, StateLoader},
};

/// Checkpoint that's expected to be looked up soon, and how often it has been.
#[derive(Debug, Clone, Copy)]
struct Precomputed {
    checkpoint: Checkpoint,
    hits: u64,
}

/// What a single locked lookup found.
enum Lookup<S> {
    Missing,
    State(Arc<S>),
    Persisted(PersistedHandle),
}

/// Everything mutated together under the cache lock.
#[derive(Debug)]
struct CacheInner<S> {
    entries: HashMap<Checkpoint, CacheItem<S>>,

    /// Every root added per epoch, in insertion order, whether resident, persisted or dropped.
    epoch_index: BTreeMap<Epoch, Vec<Buf32>>,

    /// Epochs with at least one resident state.
    in_memory_epochs: EpochQueue,

    read_stats: HashMap<Checkpoint, ReadStats>,

    precomputed: Option<Precomputed>,
}

impl<S> Default for CacheInner<S> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            epoch_index: BTreeMap::new(),
            in_memory_epochs: EpochQueue::default(),
            read_stats: HashMap::new(),
            precomputed: None,
        }
    }
}

impl<S> CacheInner<S> {
    fn lookup(&mut self, checkpoint: &Checkpoint) -> Lookup<S> {
        metrics::LOOKUPS.inc();
        let found = match self.entries.get(checkpoint) {
            None => return Lookup::Missing,
            Some(CacheItem::State(state)) => Lookup::State(state.clone()),
            Some(CacheItem::Persisted(handle)) => Lookup::Persisted(handle.clone()),
        };

        metrics::HITS.inc();
        let stats = self.read_stats.entry(*checkpoint).or_default();
        stats.reads += 1;
        stats.last_read_ms = now_ms();

        if let Some(pre) = self.precomputed.as_mut() {
            if pre.checkpoint == *checkpoint {
                pre.hits += 1;
            }
        }

        found
    }

    fn index_root(&mut self, checkpoint: &Checkpoint) {
        let roots = self.epoch_index.entry(checkpoint.epoch()).or_default();
        if !roots.contains(checkpoint.root()) {
            roots.push(*checkpoint.root());
        }
    }

    fn has_resident_state(&self, epoch: Epoch) -> bool {
        self.epoch_index.get(&epoch).is_some_and(|roots| {
            roots.iter().any(|root| {
                self.entries
                    .get(&Checkpoint::new(epoch, *root))
                    .and_then(CacheItem::as_state)
                    .is_some()
            })
        })
    }

    /// Candidate checkpoints for `root` at or below `max_epoch`, newest first.
    fn latest_candidates(&self, root: &Buf32, max_epoch: Epoch) -> Vec<Checkpoint> {
        self.epoch_index
            .range(..=max_epoch)
            .rev()
            .filter(|(_, roots)| roots.contains(root))
            .map(|(epoch, _)| Checkpoint::new(*epoch, *root))
            .collect()
    }

    /// Drops every entry of `epoch`, returning the ones that were persisted.
    fn remove_epoch(&mut self, epoch: Epoch) -> Vec<(Checkpoint, PersistedHandle)> {
        let mut handles = Vec::new();
        for root in self.epoch_index.remove(&epoch).unwrap_or_default() {
            let checkpoint = Checkpoint::new(epoch, root);
            self.read_stats.remove(&checkpoint);
            if let Some(CacheItem::Persisted(handle)) = self.entries.remove(&checkpoint) {
                handles.push((checkpoint, handle));
            }
        }
        self.in_memory_epochs.remove(epoch);
        handles
    }

    fn observe_sizes(&self) {
        let mut states = 0;
        let mut persisted = 0;
        let mut state_epochs = Vec::new();
        let mut persisted_epochs = Vec::new();
        for (checkpoint, item) in &self.entries {
            match item {
                CacheItem::State(_) => {
                    states += 1;
                    state_epochs.push(checkpoint.epoch());
                }
                CacheItem::Persisted(_) => {
                    persisted += 1;
                    persisted_epochs.push(checkpoint.epoch());
                }
            }
        }
        state_epochs.sort_unstable();
        state_epochs.dedup();
        persisted_epochs.sort_unstable();
        persisted_epochs.dedup();

        metrics::SIZE.with_label_values(&["state"]).set(states);
        metrics::SIZE.with_label_values(&["persisted"]).set(persisted);
        metrics::EPOCH_SIZE
            .with_label_values(&["state"])
            .set(state_epochs.len() as i64);
        metrics::EPOCH_SIZE
            .with_label_values(&["persisted"])
            .set(persisted_epochs.len() as i64);
    }
}

impl<S: CheckpointState> CacheInner<S> {
    /// Picks the resident states of `epoch` to persist and drops the non-canonical ones.
    ///
    /// The epoch index keeps dropped roots, so a later lookup sees neither a state nor a handle.
    fn take_for_persist(&mut self, epoch: Epoch) -> Vec<(Buf32, Arc<S>)> {
        let resident: Vec<(Buf32, Arc<S>)> = self
            .epoch_index
            .get(&epoch)
            .map(|roots| {
                roots
                    .iter()
                    .filter_map(|root| {
                        self.entries
                            .get(&Checkpoint::new(epoch, *root))
                            .and_then(CacheItem::as_state)
                            .map(|state| (*root, state.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let first_slot_root = last_slot_of_previous_epoch(epoch).and_then(|prev_slot| {
            resident
                .iter()
                .find(|(root, state)| state.block_root_at_slot(prev_slot) != Some(*root))
                .map(|(root, _)| *root)
        });

        let Some(first_slot_root) = first_slot_root else {
            return resident;
        };

        let mut to_persist = Vec::with_capacity(1);
        for (root, state) in resident {
            if root == first_slot_root {
                to_persist.push((root, state));
            } else {
                let checkpoint = Checkpoint::new(epoch, root);
                self.entries.remove(&checkpoint);
                self.read_stats.remove(&checkpoint);
                metrics::PRUNED_FROM_MEMORY.inc();
                debug!(%checkpoint, slot = state.slot(), "dropped non-canonical state from memory");
            }
        }
        to_persist
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Cache of checkpoint states keyed by [`Checkpoint`].
///
/// The lock guarding the index is never held across an await point. Removal of persisted states
/// that are no longer needed happens in detached tasks on the runtime passed at construction,
/// see [`Self::wait_for_background_tasks`]. A checkpoint is only written once every pending
/// removal for it has finished, since backends keep an existing blob rather than overwrite it.
pub struct CheckpointStateCache<S, L> {
    inner: Mutex<CacheInner<S>>,
    loader: Arc<L>,
    persistence: Arc<dyn StatePersistence>,
    head_state: Option<HeadStateFn<S>>,
    max_epochs_in_memory: usize,
    runtime: Handle,
    /// Pending removals by the checkpoint whose blob they remove.
    background: Mutex<Vec<(Checkpoint, JoinHandle<()>)>>,
}

impl<S, L> fmt::Debug for CheckpointStateCache<S, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointStateCache")
            .field("max_epochs_in_memory", &self.max_epochs_in_memory)
            .field("has_head_state", &self.head_state.is_some())
            .finish_non_exhaustive()
    }
}

impl<S, L> CheckpointStateCache<S, L>
where
    S: CheckpointState,
    L: StateLoader<S>,
{
    pub fn new(
        config: &CheckpointCacheConfig,
        loader: Arc<L>,
        persistence: Arc<dyn StatePersistence>,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            loader,
            persistence,
            head_state: None,
            max_epochs_in_memory: config.max_epochs_in_memory,
            runtime,
            background: Mutex::new(Vec::new()),
        }
    }

    /// Opens the persistence backend named in `config` and builds a cache on top of it.
    pub async fn from_config(
        config: &CheckpointCacheConfig,
        loader: Arc<L>,
        pool: ThreadPool,
    ) -> anyhow::Result<Self> {
        let persistence = create_state_persistence(&config.persistence, pool).await?;
        Ok(Self::new(config, loader, persistence, Handle::current()))
    }

    /// Sets the fallback seed used when reloading with no state resident.
    pub fn with_head_state(mut self, head_state: HeadStateFn<S>) -> Self {
        self.head_state = Some(head_state);
        self
    }

    pub fn max_epochs_in_memory(&self) -> usize {
        self.max_epochs_in_memory
    }

    /// Adds the state of a checkpoint.
    ///
    /// If the checkpoint was persisted, the state replaces the handle and the persisted copy is
    /// removed. Adding a checkpoint whose state is already resident does nothing.
    pub fn add(&self, checkpoint: Checkpoint, state: Arc<S>) {
        let stale = {
            let mut inner = self.inner.lock();
            let existing = inner
                .entries
                .get(&checkpoint)
                .map(|item| item.as_persisted().cloned());
            let stale = match existing {
                Some(None) => None,
                Some(Some(handle)) => {
                    inner.entries.insert(checkpoint, CacheItem::State(state));
                    inner.in_memory_epochs.insert(checkpoint.epoch());
                    Some(handle)
                }
                None => {
                    metrics::ADDS.inc();
                    inner.entries.insert(checkpoint, CacheItem::State(state));
                    inner.in_memory_epochs.insert(checkpoint.epoch());
                    inner.index_root(&checkpoint);
                    None
                }
            };
            inner.observe_sizes();
            stale
        };

        if let Some(handle) = stale {
            debug!(%checkpoint, %handle, "state re-added, removing persisted copy");
            self.spawn_remove(checkpoint, handle, RemoveReason::StateUpdate);
        }
    }

    /// Gets a resident state without touching persistence.
    pub fn get(&self, checkpoint: &Checkpoint) -> Option<Arc<S>> {
        match self.inner.lock().lookup(checkpoint) {
            Lookup::State(state) => Some(state),
            Lookup::Missing | Lookup::Persisted(_) => None,
        }
    }

    /// Same as [`Self::get`], by checkpoint key.
    pub fn get_by_key(&self, key: &CheckpointKey) -> Result<Option<Arc<S>>, CheckpointKeyError> {
        let checkpoint = key.checkpoint()?;
        Ok(self.get(&checkpoint))
    }

    /// Gets a state, rebuilding it from persistence if it was moved out of memory.
    ///
    /// A failure to rebuild is logged and reported as `None`. Errors reading from persistence and
    /// the lack of any seed state are returned.
    #[instrument(skip_all, fields(%checkpoint))]
    pub async fn get_or_reload(
        &self,
        checkpoint: &Checkpoint,
    ) -> Result<Option<Arc<S>>, CacheError> {
        let handle = match self.inner.lock().lookup(checkpoint) {
            Lookup::Missing => return Ok(None),
            Lookup::State(state) => return Ok(Some(state)),
            Lookup::Persisted(handle) => handle,
        };

        debug!(%handle, "reload: reading state from persistence");
        let Some(bytes) = self.persistence.read(&handle).await? else {
            warn!(%handle, "reload: persisted state is gone");
            return Ok(None);
        };

        let seed = self
            .find_seed_state(checkpoint)
            .or_else(|| self.head_state.as_ref().and_then(|head| head()))
            .ok_or(CacheError::NoSeedState(*checkpoint))?;
        let epoch_diff = seed.epoch().abs_diff(checkpoint.epoch());
        metrics::RELOAD_EPOCH_DIFF.observe(epoch_diff as f64);
        debug!(seed_slot = seed.slot(), %epoch_diff, "reload: found seed state");

        let timer = metrics::RELOAD_DURATION.start_timer();
        let loader = self.loader.clone();
        let loaded = tokio::task::spawn_blocking(move || loader.load_state(&seed, &bytes)).await;
        let state = match loaded {
            Ok(Ok(state)) => {
                timer.observe_duration();
                Arc::new(state)
            }
            Ok(Err(e)) => {
                timer.stop_and_discard();
                warn!(%handle, err = %e, "reload: failed to rebuild state");
                return Ok(None);
            }
            Err(e) => {
                timer.stop_and_discard();
                warn!(%handle, err = %e, "reload: loader task failed");
                return Ok(None);
            }
        };

        let promoted = {
            let mut inner = self.inner.lock();
            // Don't resurrect an entry that was pruned or deleted while we were loading.
            let promoted = inner.entries.contains_key(checkpoint);
            if promoted {
                inner
                    .entries
                    .insert(*checkpoint, CacheItem::State(state.clone()));
                inner.in_memory_epochs.insert(checkpoint.epoch());
                inner.observe_sizes();
            }
            promoted
        };

        if promoted {
            debug!(slot = state.slot(), "reload: state back in memory");
            self.spawn_remove(*checkpoint, handle, RemoveReason::Reload);
        } else {
            debug!("reload: entry removed while loading, not caching");
        }

        Ok(Some(state))
    }

    /// Gets the resident state or the raw persisted bytes, never rebuilding or changing the
    /// cache.
    pub async fn get_state_or_bytes(
        &self,
        checkpoint: &Checkpoint,
    ) -> Result<Option<StateOrBytes<S>>, CacheError> {
        let handle = match self.inner.lock().lookup(checkpoint) {
            Lookup::Missing => return Ok(None),
            Lookup::State(state) => return Ok(Some(StateOrBytes::State(state))),
            Lookup::Persisted(handle) => handle,
        };

        let bytes = self.persistence.read(&handle).await?;
        Ok(bytes.map(StateOrBytes::Bytes))
    }

    /// Finds the resident state for `root` at the highest epoch not above `max_epoch`.
    pub fn get_latest(&self, root: &Buf32, max_epoch: Epoch) -> Option<Arc<S>> {
        let candidates = self.inner.lock().latest_candidates(root, max_epoch);
        candidates.iter().find_map(|checkpoint| self.get(checkpoint))
    }

    /// Like [`Self::get_latest`] but reloads persisted states, moving on to older epochs when a
    /// reload fails.
    ///
    /// A missing seed state is the exception: it stops the search and is returned as an error,
    /// since no older epoch could be reloaded without one either.
    pub async fn get_or_reload_latest(
        &self,
        root: &Buf32,
        max_epoch: Epoch,
    ) -> Result<Option<Arc<S>>, CacheError> {
        let candidates = self.inner.lock().latest_candidates(root, max_epoch);
        for checkpoint in candidates {
            match self.get_or_reload(&checkpoint).await {
                Ok(Some(state)) => return Ok(Some(state)),
                Ok(None) => continue,
                Err(e @ CacheError::NoSeedState(_)) => return Err(e),
                Err(e) => {
                    debug!(%checkpoint, err = %e, "failed to get or reload state, trying older");
                }
            }
        }
        Ok(None)
    }

    /// Sets the checkpoint expected to be looked up next, returning how many times the previous
    /// one was looked up, or `None` on the first call.
    pub fn update_pre_computed_checkpoint(&self, root: Buf32, epoch: Epoch) -> Option<u64> {
        let mut inner = self.inner.lock();
        let previous = inner.precomputed.map(|pre| pre.hits);
        inner.precomputed = Some(Precomputed {
            checkpoint: Checkpoint::new(epoch, root),
            hits: 0,
        });
        previous
    }

    /// Resident state with the smallest epoch distance to `checkpoint`.
    ///
    /// Ties go to the lower epoch, then to the root added first.
    pub fn find_seed_state(&self, checkpoint: &Checkpoint) -> Option<Arc<S>> {
        let inner = self.inner.lock();
        let mut best: Option<(u64, &Arc<S>)> = None;
        for (epoch, roots) in &inner.epoch_index {
            let diff = epoch.abs_diff(checkpoint.epoch());
            if best.is_some_and(|(best_diff, _)| diff >= best_diff) {
                continue;
            }
            let resident = roots.iter().find_map(|root| {
                inner
                    .entries
                    .get(&Checkpoint::new(*epoch, *root))
                    .and_then(CacheItem::as_state)
            });
            if let Some(state) = resident {
                best = Some((diff, state));
            }
        }
        best.map(|(_, state)| state.clone())
    }

    /// Moves the oldest epochs out of memory until at most `max_epochs_in_memory` remain,
    /// returning the number of states persisted.
    ///
    /// Within an evicted epoch, if one resident state's root differs from the block root its
    /// state records for the last slot of the previous epoch, that state is the checkpoint on the
    /// chain with a block at the epoch's first slot. Only it is persisted and the other resident
    /// states of the epoch are dropped. Otherwise every resident state of the epoch is persisted.
    /// States are written one at a time.
    #[instrument(skip_all)]
    pub async fn prune_from_memory(&self) -> Result<usize, CacheError> {
        let mut count = 0;
        loop {
            let (epoch, to_persist) = {
                let mut inner = self.inner.lock();
                if inner.in_memory_epochs.len() <= self.max_epochs_in_memory {
                    break;
                }
                let epoch = inner.in_memory_epochs.pop_front().ok_or_else(|| {
                    CacheError::InvariantViolation("no epoch left in memory".to_owned())
                })?;
                let to_persist = inner.take_for_persist(epoch);
                inner.observe_sizes();
                (epoch, to_persist)
            };

            for (root, state) in to_persist {
                let checkpoint = Checkpoint::new(epoch, root);
                let handle = match self.persist_state(checkpoint, state.clone()).await {
                    Ok(handle) => handle,
                    Err(e) => {
                        // What's left of the epoch is still resident.
                        let mut inner = self.inner.lock();
                        if inner.has_resident_state(epoch) {
                            inner.in_memory_epochs.push_front(epoch);
                        }
                        return Err(e);
                    }
                };

                let still_ours = {
                    let mut inner = self.inner.lock();
                    let still_ours = inner
                        .entries
                        .get(&checkpoint)
                        .and_then(CacheItem::as_state)
                        .is_some_and(|current| Arc::ptr_eq(current, &state));
                    if still_ours {
                        inner
                            .entries
                            .insert(checkpoint, CacheItem::Persisted(handle.clone()));
                        inner.observe_sizes();
                    }
                    still_ours
                };

                if still_ours {
                    count += 1;
                    info!(%checkpoint, slot = state.slot(), "persisted checkpoint state");
                } else {
                    // Deleted or replaced while we were writing, nothing refers to the blob.
                    debug!(%checkpoint, "entry changed while persisting, dropping written state");
                    self.spawn_remove(checkpoint, handle, RemoveReason::Delete);
                }
            }
        }

        Ok(count)
    }

    async fn persist_state(
        &self,
        checkpoint: Checkpoint,
        state: Arc<S>,
    ) -> Result<PersistedHandle, CacheError> {
        self.wait_for_pending_removals(&checkpoint).await;

        let timer = metrics::PERSIST_DURATION.start_timer();
        let loader = self.loader.clone();
        let bytes = tokio::task::spawn_blocking(move || loader.serialize_state(&state))
            .await
            .map_err(|e| CacheError::WorkerFailed(e.to_string()))?;
        let handle = self.persistence.write(checkpoint, bytes).await?;
        timer.observe_duration();
        Ok(handle)
    }

    /// Drops every checkpoint below `finalized_epoch`, from memory and persistence.
    pub fn prune_finalized(&self, finalized_epoch: Epoch) {
        let handles = {
            let mut inner = self.inner.lock();
            let epochs: Vec<Epoch> = inner
                .epoch_index
                .range(..finalized_epoch)
                .map(|(epoch, _)| *epoch)
                .collect();
            let handles: Vec<_> = epochs
                .into_iter()
                .flat_map(|epoch| inner.remove_epoch(epoch))
                .collect();
            inner.observe_sizes();
            handles
        };

        if !handles.is_empty() {
            info!(%finalized_epoch, removed = handles.len(), "pruning finalized persisted states");
        }
        for (checkpoint, handle) in handles {
            self.spawn_remove(checkpoint, handle, RemoveReason::PruneFinalized);
        }
    }

    /// Drops every checkpoint of `epoch`, from memory and persistence.
    pub fn delete_all_epoch_items(&self, epoch: Epoch) {
        let handles = {
            let mut inner = self.inner.lock();
            let handles = inner.remove_epoch(epoch);
            inner.observe_sizes();
            handles
        };
        for (checkpoint, handle) in handles {
            self.spawn_remove(checkpoint, handle, RemoveReason::PruneFinalized);
        }
    }

    /// Drops a single checkpoint, removing its persisted state if there is one.
    pub fn delete(&self, checkpoint: &Checkpoint) {
        let removed = {
            let mut inner = self.inner.lock();
            let removed = inner.entries.remove(checkpoint);
            inner.read_stats.remove(checkpoint);

            let epoch = checkpoint.epoch();
            if let Some(roots) = inner.epoch_index.get_mut(&epoch) {
                roots.retain(|root| root != checkpoint.root());
                if roots.is_empty() {
                    inner.epoch_index.remove(&epoch);
                }
            }
            if !inner.has_resident_state(epoch) {
                inner.in_memory_epochs.remove(epoch);
            }
            inner.observe_sizes();
            removed
        };

        if let Some(handle) = removed.as_ref().and_then(CacheItem::as_persisted) {
            self.spawn_remove(*checkpoint, handle.clone(), RemoveReason::Delete);
        }
    }

    /// Forgets everything. Persisted states are left where they are.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.epoch_index.clear();
        inner.in_memory_epochs.clear();
        inner.read_stats.clear();
        inner.observe_sizes();
    }

    /// Removes persisted states below `finalized_epoch` that the cache no longer refers to,
    /// such as ones left behind by a crash between a reload and the removal of its blob.
    ///
    /// Returns the number of states removed.
    pub async fn sweep_persisted_before(
        &self,
        finalized_epoch: Epoch,
    ) -> Result<usize, CacheError> {
        let bound = {
            let inner = self.inner.lock();
            inner
                .entries
                .iter()
                .filter(|(_, item)| item.as_persisted().is_some())
                .map(|(checkpoint, _)| checkpoint.epoch())
                .min()
                .map_or(finalized_epoch, |lowest| lowest.min(finalized_epoch))
        };

        let swept = self.persistence.sweep_before(bound).await?;
        if !swept.is_empty() {
            info!(%bound, swept = swept.len(), "removed orphaned persisted states");
        }
        Ok(swept.len())
    }

    /// Waits for every detached removal spawned so far.
    pub async fn wait_for_background_tasks(&self) {
        let tasks = mem::take(&mut *self.background.lock());
        for (checkpoint, task) in tasks {
            if let Err(e) = task.await {
                warn!(%checkpoint, err = %e, "background removal task failed");
            }
        }
    }

    /// Waits for the removals spawned so far for `checkpoint`.
    async fn wait_for_pending_removals(&self, checkpoint: &Checkpoint) {
        let pending: Vec<_> = {
            let mut background = self.background.lock();
            let (pending, rest) = mem::take(&mut *background)
                .into_iter()
                .partition(|(cp, _)| cp == checkpoint);
            *background = rest;
            pending
        };

        for (_, task) in pending {
            trace!(%checkpoint, "waiting on pending removal before writing");
            if let Err(e) = task.await {
                warn!(%checkpoint, err = %e, "background removal task failed");
            }
        }
    }

    fn spawn_remove(
        &self,
        checkpoint: Checkpoint,
        handle: PersistedHandle,
        reason: RemoveReason,
    ) {
        metrics::PERSISTED_REMOVED
            .with_label_values(&[reason.as_str()])
            .inc();
        let persistence = self.persistence.clone();
        let task = self.runtime.spawn(async move {
            if let Err(e) = persistence.remove(&handle).await {
                warn!(%handle, %reason, err = %e, "failed to remove persisted state");
            }
        });

        let mut background = self.background.lock();
        background.retain(|(_, task)| !task.is_finished());
        background.push((checkpoint, task));
    }

    /// Debug summary of every entry, ordered by checkpoint.
    pub fn dump_summary(&self) -> Vec<StateCacheItem> {
        let inner = self.inner.lock();
        let mut checkpoints: Vec<_> = inner.entries.keys().copied().collect();
        checkpoints.sort_unstable();
        checkpoints
            .into_iter()
            .map(|checkpoint| {
                let stats = inner
                    .read_stats
                    .get(&checkpoint)
                    .copied()
                    .unwrap_or_default();
                let file_path = inner
                    .entries
                    .get(&checkpoint)
                    .and_then(CacheItem::as_persisted)
                    .map(|handle| handle.to_string());
                StateCacheItem {
                    slot: compute_start_slot_at_epoch(checkpoint.epoch()),
                    root: *checkpoint.root(),
                    reads: stats.reads,
                    last_read_ms: stats.last_read_ms,
                    checkpoint_state: true,
                    file_path,
                }
            })
            .collect()
    }

    /// Keys of every entry, ordered by checkpoint.
    pub fn dump_checkpoint_keys(&self) -> Vec<CheckpointKey> {
        let inner = self.inner.lock();
        let mut checkpoints: Vec<_> = inner.entries.keys().copied().collect();
        checkpoints.sort_unstable();
        checkpoints.iter().map(Checkpoint::to_key).collect()
    }

    /// Number of entries, resident or persisted.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn state_count(&self) -> usize {
        let inner = self.inner.lock();
        inner
            .entries
            .values()
            .filter(|item| item.as_state().is_some())
            .count()
    }

    pub fn persisted_count(&self) -> usize {
        let inner = self.inner.lock();
        inner
            .entries
            .values()
            .filter(|item| item.as_persisted().is_some())
            .count()
    }

    /// Epochs with resident states, oldest first.
    pub fn in_memory_epochs(&self) -> Vec<Epoch> {
        self.inner.lock().in_memory_epochs.iter().collect()
    }

    /// Roots ever added for `epoch` that haven't been deleted or finalized away.
    pub fn indexed_roots(&self, epoch: Epoch) -> Vec<Buf32> {
        self.inner
            .lock()
            .epoch_index
            .get(&epoch)
            .cloned()
            .unwrap_or_default()
    }

    /// Handle the checkpoint's state is persisted under, if it isn't resident.
    pub fn persisted_handle(&self, checkpoint: &Checkpoint) -> Option<PersistedHandle> {
        self.inner
            .lock()
            .entries
            .get(checkpoint)
            .and_then(CacheItem::as_persisted)
            .cloned()
    }
}
