//! Error taxonomy of the snapshot subsystem.
//!
//! - Unavailable / TornRead — мягкие ошибки: poller отступает и повторяет.
//! - OutOfRange — нарушение контракта вызывающей стороной.
//! - CapacityExhausted — единственная фатальная ошибка (аллокация при росте таблицы).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot unavailable at {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("torn snapshot read: {0}")]
    TornRead(#[source] io::Error),
    #[error("chunk index {index} out of range (count={count})")]
    OutOfRange { index: usize, count: usize },
    #[error("cannot grow chunk table to {requested} records")]
    CapacityExhausted { requested: usize },
}

impl SnapshotError {
    /// True for conditions the poller recovers from by backing off.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SnapshotError::Unavailable { .. } | SnapshotError::TornRead(_))
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
