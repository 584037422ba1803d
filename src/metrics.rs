//! Lightweight global metrics for the snapshot poller.
//!
//! Потокобезопасные атомарные счётчики исходов опроса:
//! - publish / unchanged / unavailable / torn
//! - decoded records

use std::sync::atomic::{AtomicU64, Ordering};

static POLLS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_PUBLISHED: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_UNCHANGED: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_UNAVAILABLE: AtomicU64 = AtomicU64::new(0);
static TORN_READS: AtomicU64 = AtomicU64::new(0);
static RECORDS_DECODED: AtomicU64 = AtomicU64::new(0);
static TABLE_REALLOCS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub polls_total: u64,
    pub snapshots_published: u64,
    pub snapshots_unchanged: u64,
    pub snapshots_unavailable: u64,
    pub torn_reads: u64,
    pub records_decoded: u64,
    pub table_reallocs: u64,
}

impl MetricsSnapshot {
    /// Share of polls that found a new stamp and published it.
    pub fn publish_ratio(&self) -> f64 {
        if self.polls_total == 0 {
            0.0
        } else {
            self.snapshots_published as f64 / self.polls_total as f64
        }
    }
}

pub fn record_poll() {
    POLLS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn record_published(records: usize) {
    SNAPSHOTS_PUBLISHED.fetch_add(1, Ordering::Relaxed);
    RECORDS_DECODED.fetch_add(records as u64, Ordering::Relaxed);
}

pub fn record_unchanged() {
    SNAPSHOTS_UNCHANGED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_unavailable() {
    SNAPSHOTS_UNAVAILABLE.fetch_add(1, Ordering::Relaxed);
}

pub fn record_torn_read() {
    TORN_READS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_table_realloc() {
    TABLE_REALLOCS.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        polls_total: POLLS_TOTAL.load(Ordering::Relaxed),
        snapshots_published: SNAPSHOTS_PUBLISHED.load(Ordering::Relaxed),
        snapshots_unchanged: SNAPSHOTS_UNCHANGED.load(Ordering::Relaxed),
        snapshots_unavailable: SNAPSHOTS_UNAVAILABLE.load(Ordering::Relaxed),
        torn_reads: TORN_READS.load(Ordering::Relaxed),
        records_decoded: RECORDS_DECODED.load(Ordering::Relaxed),
        table_reallocs: TABLE_REALLOCS.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    POLLS_TOTAL.store(0, Ordering::Relaxed);
    SNAPSHOTS_PUBLISHED.store(0, Ordering::Relaxed);
    SNAPSHOTS_UNCHANGED.store(0, Ordering::Relaxed);
    SNAPSHOTS_UNAVAILABLE.store(0, Ordering::Relaxed);
    TORN_READS.store(0, Ordering::Relaxed);
    RECORDS_DECODED.store(0, Ordering::Relaxed);
    TABLE_REALLOCS.store(0, Ordering::Relaxed);
}
