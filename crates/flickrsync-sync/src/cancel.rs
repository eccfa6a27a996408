//! Cooperative stop flag
//!
//! The engine polls [`StopFlag::is_stopped`] before each photo. A stop never
//! interrupts a Flickr call that is already in flight; it only prevents the
//! next one from starting.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Shared, cloneable stop signal
///
/// Clones observe the same state, so a signal handler can hold one clone
/// while the engine holds another.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    token: CancellationToken,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop at the next photo boundary. Idempotent.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            info!("Stop requested, finishing the current photo");
        }
        self.token.cancel();
    }

    /// Non-blocking check
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once a stop has been requested
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }
}
