//! Cooperative stop signalling for a running batch
//!
//! A `StopHandle` is a shared flag. The batch loop checks it at every item
//! boundary and the resolver checks it between sub-sitemaps; an in-flight
//! fetch is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the batch to stop at the next boundary
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears a previous request (used when resuming)
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
