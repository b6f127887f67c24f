//! Prometheus metrics for the checkpoint state cache.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge_vec,
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec,
};

lazy_static! {
    /// Lookups by checkpoint, resident or not.
    pub static ref LOOKUPS: IntCounter = register_int_counter!(
        "beacon_cp_state_cache_lookups_total",
        "Total number of checkpoint state cache lookups"
    )
    .unwrap();

    /// Lookups that found an entry, resident or persisted.
    pub static ref HITS: IntCounter = register_int_counter!(
        "beacon_cp_state_cache_hits_total",
        "Total number of checkpoint state cache lookups that found an entry"
    )
    .unwrap();

    pub static ref ADDS: IntCounter = register_int_counter!(
        "beacon_cp_state_cache_adds_total",
        "Total number of new checkpoints added"
    )
    .unwrap();

    /// Persisted states removed.
    pub static ref PERSISTED_REMOVED: IntCounterVec = register_int_counter_vec!(
        "beacon_cp_state_cache_persisted_removed_total",
        "Total number of persisted checkpoint states removed",
        &["reason"] // reason=[prune_finalized|reload|state_update|delete]
    )
    .unwrap();

    pub static ref PERSIST_DURATION: Histogram = register_histogram!(
        HistogramOpts::new(
            "beacon_cp_state_cache_persist_duration_seconds",
            "Time spent serializing and writing a checkpoint state"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0])
    )
    .unwrap();

    pub static ref RELOAD_DURATION: Histogram = register_histogram!(
        HistogramOpts::new(
            "beacon_cp_state_cache_reload_duration_seconds",
            "Time spent rebuilding a checkpoint state from persistence"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0])
    )
    .unwrap();

    /// Epoch distance between a reloaded checkpoint and its seed.
    pub static ref RELOAD_EPOCH_DIFF: Histogram = register_histogram!(
        HistogramOpts::new(
            "beacon_cp_state_cache_reload_epoch_diff",
            "Epoch distance between a reloaded state and its seed"
        )
        .buckets(vec![0.0, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0])
    )
    .unwrap();

    /// Fork states dropped from memory without being persisted.
    pub static ref PRUNED_FROM_MEMORY: IntCounter = register_int_counter!(
        "beacon_cp_state_cache_pruned_from_memory_total",
        "Total number of non-canonical checkpoint states dropped from memory"
    )
    .unwrap();

    pub static ref SIZE: IntGaugeVec = register_int_gauge_vec!(
        "beacon_cp_state_cache_size",
        "Number of checkpoint cache entries",
        &["type"] // type=[state|persisted]
    )
    .unwrap();

    pub static ref EPOCH_SIZE: IntGaugeVec = register_int_gauge_vec!(
        "beacon_cp_state_cache_epoch_size",
        "Number of epochs with checkpoint cache entries",
        &["type"] // type=[state|persisted]
    )
    .unwrap();
}
