//! Cancellation handle for live queries.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Handle to an open live query.
///
/// The release hook runs exactly once: on [`Subscription::cancel`] or, failing
/// that, when the handle is dropped. The shared `live` flag is cleared before
/// the hook runs. Backends deliver through a [`DeliveryGate`] whose `drain`
/// the hook calls, so once `cancel` returns no callback is running or will
/// start.
pub struct Subscription {
    live: Arc<AtomicBool>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(live: Arc<AtomicBool>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            live,
            release: Some(Box::new(release)),
        }
    }

    /// Whether the backend is still delivering snapshots.
    ///
    /// Turns false after cancellation, or when a remote watch ends on its own.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            self.live.store(false, Ordering::SeqCst);
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Serializes deliveries to one listener with each other and with its
/// cancellation.
///
/// Every delivery carries the store version its snapshot was taken at. A
/// delivery runs only while the subscription is live and only if nothing
/// newer has gone out yet, so overlapping writers can never leave an older
/// snapshot as the last one a listener saw. The listener runs with the gate
/// held; [`DeliveryGate::drain`] waits for it, which is what keeps callbacks
/// from firing after `cancel` returns. Cancelling from inside the listener
/// itself would wait on its own delivery.
#[derive(Debug)]
pub struct DeliveryGate {
    live: Arc<AtomicBool>,
    last_version: Mutex<Option<u64>>,
}

impl DeliveryGate {
    pub fn new(live: Arc<AtomicBool>) -> Self {
        Self {
            live,
            last_version: Mutex::new(None),
        }
    }

    pub fn live(&self) -> Arc<AtomicBool> {
        self.live.clone()
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Mark the feed as ended without running the subscription's release.
    pub fn close(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    /// Run `deliver` for a snapshot taken at `version`. Returns whether it ran.
    pub fn deliver(&self, version: u64, deliver: impl FnOnce()) -> bool {
        let Ok(mut last_version) = self.last_version.lock() else {
            return false;
        };
        if !self.is_live() {
            return false;
        }
        if last_version.is_some_and(|last| last >= version) {
            return false;
        }
        *last_version = Some(version);
        deliver();
        true
    }

    /// Block until no delivery is in flight.
    pub fn drain(&self) {
        drop(self.last_version.lock());
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.is_live())
            .field("released", &self.release.is_none())
            .finish()
    }
}
