//! Live capture region shared between the UI thread and the capture loop
//!
//! The region is the one piece of state read directly across threads: the UI
//! thread rewrites it on every overlay drag, the worker thread snapshots it at
//! each tick. The mutex guarantees the snapshot is a consistent tuple, never a
//! torn mix of old and new coordinates.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::types::CaptureRegion;

/// Source of the capture rectangle for the current tick
pub trait RegionSource: Send + Sync {
    /// The most recently committed region
    fn region(&self) -> CaptureRegion;
}

/// Cross-thread handle to the live capture region
#[derive(Clone)]
pub struct SharedRegion {
    inner: Arc<Mutex<CaptureRegion>>,
}

impl SharedRegion {
    /// Create a shared region with an initial value
    pub fn new(region: CaptureRegion) -> Self {
        Self {
            inner: Arc::new(Mutex::new(region)),
        }
    }

    /// Commit a new region (called by the UI thread on drag)
    pub fn set(&self, region: CaptureRegion) {
        *self.inner.lock() = region;
    }

    /// Snapshot the current region
    pub fn snapshot(&self) -> CaptureRegion {
        *self.inner.lock()
    }
}

impl RegionSource for SharedRegion {
    fn region(&self) -> CaptureRegion {
        self.snapshot()
    }
}

impl std::fmt::Debug for SharedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedRegion").field(&self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_latest_set() {
        let shared = SharedRegion::new(CaptureRegion::square(0, 0, 400));
        shared.set(CaptureRegion::square(120, -40, 400));
        assert_eq!(shared.snapshot(), CaptureRegion::square(120, -40, 400));
    }

    #[test]
    fn clones_share_the_same_region() {
        let a = SharedRegion::new(CaptureRegion::square(0, 0, 400));
        let b = a.clone();
        b.set(CaptureRegion::square(50, 60, 400));
        assert_eq!(a.snapshot(), CaptureRegion::square(50, 60, 400));
    }
}
