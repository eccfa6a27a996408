//! Request pacing for the Flickr API
//!
//! Flickr asks API clients to stay well under 3600 queries per hour. The
//! client sleeps a fixed, configured delay before every call instead of
//! tracking a budget; the delay applies equally to uploads and REST calls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use flickrsync_flickr::rate_limit::RequestPacer;
//!
//! # async fn example() {
//! let pacer = RequestPacer::new(Duration::from_millis(1000));
//! pacer.wait("flickr.photos.delete").await;
//! // ... make API call ...
//! # }
//! ```

use std::time::Duration;

use tracing::trace;

/// Sleeps a fixed delay before each API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPacer {
    delay: Duration,
}

impl RequestPacer {
    /// Creates a pacer that waits `delay` before every call
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a pacer from a millisecond count, as found in the config file
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// A pacer that never waits (used in tests)
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// The configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the configured delay before the call named `operation`
    pub async fn wait(&self, operation: &str) {
        if self.delay.is_zero() {
            return;
        }
        trace!(
            operation,
            delay_ms = self.delay.as_millis() as u64,
            "Pacing API call"
        );
        tokio::time::sleep(self.delay).await;
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::from_millis(1000)
    }
}
