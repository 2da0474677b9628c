//! Lifecycle counters.
//!
//! A failed notification never reaches the caller of confirm, so operators
//! need another place to see it: the `tracing` warning plus the
//! `notifications_failed` counter here.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleCounts {
    pub created: u64,
    pub confirmed: u64,
    pub reconfirmed: u64,
    pub notifications_published: u64,
    pub notifications_failed: u64,
    pub notifications_skipped: u64,
}

#[derive(Debug, Default)]
pub struct LifecycleCounters {
    created: AtomicU64,
    confirmed: AtomicU64,
    reconfirmed: AtomicU64,
    notifications_published: AtomicU64,
    notifications_failed: AtomicU64,
    notifications_skipped: AtomicU64,
}

impl LifecycleCounters {
    pub fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_confirmed(&self) {
        self.confirmed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconfirmed(&self) {
        self.reconfirmed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self) {
        self.notifications_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failed(&self) {
        self.notifications_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Publishing is switched off in configuration.
    pub fn record_publish_skipped(&self) {
        self.notifications_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LifecycleCounts {
        LifecycleCounts {
            created: self.created.load(Ordering::Relaxed),
            confirmed: self.confirmed.load(Ordering::Relaxed),
            reconfirmed: self.reconfirmed.load(Ordering::Relaxed),
            notifications_published: self.notifications_published.load(Ordering::Relaxed),
            notifications_failed: self.notifications_failed.load(Ordering::Relaxed),
            notifications_skipped: self.notifications_skipped.load(Ordering::Relaxed),
        }
    }
}
