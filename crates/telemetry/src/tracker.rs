//! Live role accounting

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts role loops that are currently running
#[derive(Debug, Clone, Default)]
pub struct RoleTracker {
    alive: Arc<AtomicUsize>,
}

impl RoleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a role as running until the returned guard is dropped
    pub fn enter(&self) -> RoleGuard {
        self.alive.fetch_add(1, Ordering::AcqRel);
        RoleGuard {
            alive: Arc::clone(&self.alive),
        }
    }

    /// Roles currently running
    pub fn alive(&self) -> usize {
        self.alive.load(Ordering::Acquire)
    }
}

/// Held by a running role; decrements the tracker on drop
#[derive(Debug)]
pub struct RoleGuard {
    alive: Arc<AtomicUsize>,
}

impl Drop for RoleGuard {
    fn drop(&mut self) {
        self.alive.fetch_sub(1, Ordering::AcqRel);
    }
}
