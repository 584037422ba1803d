//! Publication slot: single writer (poller), many readers (renderers).
//!
//! Readers only ever see a complete `Arc<ChunkTable>`; publication is one reference
//! swap under a short lock. The generation counter lets readers detect a new
//! publication without taking the lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::table::ChunkTable;

/// Receiver of freshly published tables.
///
/// Called on the poller thread right after publication; keep it fast. The table is
/// shared and immutable, so holding on to the `Arc` is fine.
pub trait SnapshotConsumer: Send + Sync {
    fn on_snapshot_updated(&self, table: Arc<ChunkTable>);
}

impl<F> SnapshotConsumer for F
where
    F: Fn(Arc<ChunkTable>) + Send + Sync,
{
    fn on_snapshot_updated(&self, table: Arc<ChunkTable>) {
        self(table)
    }
}

#[derive(Default)]
pub struct SnapshotSlot {
    current: Mutex<Option<Arc<ChunkTable>>>,
    generation: AtomicU64,
}

impl SnapshotSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Currently published table, if any.
    pub fn current(&self) -> Option<Arc<ChunkTable>> {
        self.lock().clone()
    }

    /// Number of publications so far (0 = nothing published yet).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Swap in `table`; returns the previously published one.
    pub fn publish(&self, table: Arc<ChunkTable>) -> Option<Arc<ChunkTable>> {
        let prev = self.lock().replace(table);
        self.generation.fetch_add(1, Ordering::Release);
        prev
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<ChunkTable>>> {
        // Под замком только swap ссылки: отравление не оставляет частичного состояния.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
