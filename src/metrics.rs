use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub fetches_ok: Arc<AtomicU64>,
    pub fetches_failed: Arc<AtomicU64>,
    pub orders_reconciled: Arc<AtomicU64>,
    pub order_writes: Arc<AtomicU64>,
    pub entries_purged: Arc<AtomicU64>,
    pub listings_built: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            fetches_ok: Arc::new(AtomicU64::new(0)),
            fetches_failed: Arc::new(AtomicU64::new(0)),
            orders_reconciled: Arc::new(AtomicU64::new(0)),
            order_writes: Arc::new(AtomicU64::new(0)),
            entries_purged: Arc::new(AtomicU64::new(0)),
            listings_built: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_fetches_ok(&self) {
        self.fetches_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetches_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_orders_reconciled(&self) {
        self.orders_reconciled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_order_writes(&self) {
        self.order_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_entries_purged(&self, count: u64) {
        self.entries_purged.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_listings_built(&self) {
        self.listings_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches_ok: self.fetches_ok.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            orders_reconciled: self.orders_reconciled.load(Ordering::Relaxed),
            order_writes: self.order_writes.load(Ordering::Relaxed),
            entries_purged: self.entries_purged.load(Ordering::Relaxed),
            listings_built: self.listings_built.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub fetches_ok: u64,
    pub fetches_failed: u64,
    pub orders_reconciled: u64,
    pub order_writes: u64,
    pub entries_purged: u64,
    pub listings_built: u64,
    pub uptime_seconds: u64,
}
