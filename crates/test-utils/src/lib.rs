//! Shared fixtures for tests across the workspace.

use std::sync::Once;

use beacon_primitives::{Buf32, Checkpoint, Epoch};
use tracing_subscriber::EnvFilter;

static LOGGING: Once = Once::new();

/// Installs a fmt subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Builds a root whose first and last bytes are `n`, so distinct `n` give distinct roots.
pub fn make_root(n: u8) -> Buf32 {
    let mut raw = [0u8; 32];
    raw[0] = n;
    raw[31] = n;
    Buf32::from(raw)
}

/// Shorthand for a checkpoint with a [`make_root`] root.
pub fn make_checkpoint(epoch: Epoch, n: u8) -> Checkpoint {
    Checkpoint::new(epoch, make_root(n))
}
