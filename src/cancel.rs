//! Cooperative cancellation for generation runs
//!
//! A `CancellationToken` is passed explicitly to the generation pipeline and
//! checked between candidates. Whoever observes a reason to stop (a forced
//! mock, a caller giving up) cancels the token with that reason.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Requested,
    /// The run had to force a mock it could not support
    ForcedMock,
}

#[derive(Debug, Default)]
struct Shared {
    cancelled: AtomicBool,
    reason: Mutex<Option<CancelReason>>,
}

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel with `reason`. The first reason recorded wins.
    pub fn cancel(&self, reason: CancelReason) {
        if let Ok(mut recorded) = self.shared.reason.lock() {
            recorded.get_or_insert(reason);
        }
        if !self.shared.cancelled.swap(true, Ordering::SeqCst) {
            log::debug!("generation cancelled: {:?}", reason);
        }
    }

    /// Report an attempted mock; a mock that had to be forced cancels the run
    pub fn on_should_mock(&self, forced: bool) {
        if forced {
            self.cancel(CancelReason::ForcedMock);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> Option<CancelReason> {
        self.shared.reason.lock().ok().and_then(|reason| *reason)
    }
}
