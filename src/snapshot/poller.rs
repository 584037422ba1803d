//! Live snapshot poller.
//!
//! Один цикл опроса:
//! 1. open (ошибка -> Unavailable, длинная пауза)
//! 2. stamp == last_seen -> Unchanged, короткая пауза, опубликованная таблица не трогается
//! 3. count -> ensure_capacity -> refresh_from -> publish (одна подмена ссылки)
//! 4. любая ошибка чтения в 2–3 -> TornRead, stamp не продвигается, длинная пауза
//!
//! The producer rewrites the file in place without atomic rename, so a read can race
//! a rewrite. Decoding always goes into a private working table; the published table
//! is replaced only after a complete decode, and `last_seen_stamp` is committed
//! together with it. A torn read is therefore retried on the next poll.
//!
//! Assumes the producer never writes stamp 0 (`NO_STAMP`).

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use super::format::{check_declared_len, read_count, read_stamp};
use super::slot::{SnapshotConsumer, SnapshotSlot};
use crate::config::PollerConfig;
use crate::consts::NO_STAMP;
use crate::error::{Result, SnapshotError};
use crate::metrics;
use crate::table::ChunkTable;

/// Result of a single poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Published { stamp: u64, count: usize },
    Unchanged,
    Unavailable,
    TornRead,
}

/// Cooperative stop flag, checked at every backoff point.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Park the current thread for up to `d`. Returns false if stopped meanwhile.
    /// Wakes early on `Thread::unpark`.
    pub fn sleep(&self, d: Duration) -> bool {
        let deadline = Instant::now() + d;
        loop {
            if self.is_stopped() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

pub struct SnapshotPoller {
    cfg: PollerConfig,
    last_seen_stamp: u64,
    working: ChunkTable,
    slot: Arc<SnapshotSlot>,
    consumers: Vec<Box<dyn SnapshotConsumer>>,
}

impl SnapshotPoller {
    pub fn new(cfg: PollerConfig) -> Result<Self> {
        Self::with_slot(cfg, SnapshotSlot::new())
    }

    /// Poller publishing into an existing slot.
    pub fn with_slot(cfg: PollerConfig, slot: Arc<SnapshotSlot>) -> Result<Self> {
        let working = ChunkTable::with_capacity(cfg.initial_capacity)?;
        Ok(Self {
            cfg,
            last_seen_stamp: NO_STAMP,
            working,
            slot,
            consumers: Vec::new(),
        })
    }

    pub fn config(&self) -> &PollerConfig {
        &self.cfg
    }

    pub fn slot(&self) -> Arc<SnapshotSlot> {
        self.slot.clone()
    }

    pub fn last_seen_stamp(&self) -> u64 {
        self.last_seen_stamp
    }

    /// Register a consumer notified after every publication.
    pub fn add_consumer<C: SnapshotConsumer + 'static>(&mut self, consumer: C) {
        self.consumers.push(Box::new(consumer));
    }

    /// One poll of the snapshot file. Only fatal errors (capacity) are returned as `Err`.
    pub fn poll_once(&mut self) -> Result<PollOutcome> {
        metrics::record_poll();
        let path = &self.cfg.snapshot_path;

        let file = match File::open(path) {
            Ok(f) => f,
            Err(source) => {
                metrics::record_unavailable();
                let e = SnapshotError::Unavailable {
                    path: path.clone(),
                    source,
                };
                debug!("poll: {}", e);
                return Ok(PollOutcome::Unavailable);
            }
        };
        let file_len = file.metadata().ok().map(|m| m.len());
        let mut rdr = BufReader::new(file);

        match self.ingest(&mut rdr, file_len) {
            Ok(outcome) => Ok(outcome),
            Err(SnapshotError::TornRead(e)) => {
                metrics::record_torn_read();
                warn!(
                    "poll: torn read of {} (stamp stays {}): {}",
                    self.cfg.snapshot_path.display(),
                    self.last_seen_stamp,
                    e
                );
                Ok(PollOutcome::TornRead)
            }
            Err(e) => Err(e),
        }
    }

    /// Consume one snapshot image from `r`. `file_len`, when known, is used to reject a
    /// header whose record count the file cannot hold yet, before any allocation.
    ///
    /// - Ok(Unchanged) — stamp equals the last seen one; nothing touched.
    /// - Ok(Published) — table decoded, sorted and published.
    /// - Err(TornRead) — stream ended early; stamp and published table unchanged.
    pub fn ingest<R: Read>(&mut self, r: &mut R, file_len: Option<u64>) -> Result<PollOutcome> {
        let stamp = read_stamp(r)?;
        if stamp == self.last_seen_stamp {
            metrics::record_unchanged();
            return Ok(PollOutcome::Unchanged);
        }

        let count = read_count(r)?;
        if let Some(len) = file_len {
            check_declared_len(stamp, count, len)?;
        }

        let count = count as usize;
        // пустой store (таблица ушла читателям) тоже перевыделяется
        let cap_before = self.working.capacity();
        if let Err(e) = self.working.ensure_capacity(count) {
            error!("poll: cannot size chunk table for {} records: {}", count, e);
            return Err(e);
        }
        if self.working.capacity() != cap_before {
            metrics::record_table_realloc();
            debug!("chunk table grown to capacity {} (count={})", self.working.capacity(), count);
        }

        self.working.refresh_from(r)?;

        self.last_seen_stamp = stamp;
        self.publish();
        metrics::record_published(count);
        debug!("poll: published stamp={} count={}", stamp, count);
        Ok(PollOutcome::Published { stamp, count })
    }

    fn publish(&mut self) {
        let table = Arc::new(std::mem::take(&mut self.working));
        if let Some(prev) = self.slot.publish(table.clone()) {
            // Если читатели уже отпустили прошлую таблицу — переиспользуем её буфер.
            if let Ok(reclaimed) = Arc::try_unwrap(prev) {
                self.working = reclaimed;
            }
        }
        for c in &self.consumers {
            c.on_snapshot_updated(table.clone());
        }
    }

    /// Poll until `stop` is raised. Returns `Err` only on a fatal error.
    pub fn run(mut self, stop: &StopSignal) -> Result<()> {
        info!("snapshot poller started: {}", self.cfg);
        let mut first = true;
        while !stop.is_stopped() {
            let pause = match self.poll_once()? {
                PollOutcome::Published { stamp, count } => {
                    if first {
                        info!("first snapshot: stamp={} count={}", stamp, count);
                        first = false;
                    }
                    // сразу перечитать: следующий опрос увидит тот же stamp и уйдёт в короткую паузу
                    Duration::ZERO
                }
                PollOutcome::Unchanged => self.cfg.short_backoff(),
                PollOutcome::Unavailable | PollOutcome::TornRead => self.cfg.long_backoff(),
            };
            if !pause.is_zero() && !stop.sleep(pause) {
                break;
            }
        }
        info!("snapshot poller stopped at stamp {}", self.last_seen_stamp);
        Ok(())
    }

    /// Run on a dedicated thread.
    pub fn spawn(self) -> io::Result<PollerHandle> {
        let stop = StopSignal::new();
        let slot = self.slot();
        let thread_stop = stop.clone();
        let join = thread::Builder::new()
            .name("chunkscope-poller".into())
            .spawn(move || self.run(&thread_stop))?;
        Ok(PollerHandle {
            stop,
            slot,
            join: Some(join),
        })
    }
}

/// Handle of a poller thread. Dropping it stops and joins the thread.
pub struct PollerHandle {
    stop: StopSignal,
    slot: Arc<SnapshotSlot>,
    join: Option<JoinHandle<Result<()>>>,
}

impl PollerHandle {
    pub fn slot(&self) -> Arc<SnapshotSlot> {
        self.slot.clone()
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, |j| j.is_finished())
    }

    /// Signal stop, wake the poller out of its backoff and wait for it.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        self.stop.stop();
        match self.join.take() {
            Some(j) => {
                j.thread().unpark();
                j.join().unwrap_or_else(|p| std::panic::resume_unwind(p))
            }
            None => Ok(()),
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("snapshot poller ended with error: {}", e);
        }
    }
}
