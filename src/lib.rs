#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod error;
pub mod config;
pub mod metrics;

// Таблица чанков (packed store + сортировка)
pub mod table;   // src/table/{mod,packed,sort}.rs

// Чтение снапшота и публикация
pub mod snapshot; // src/snapshot/{mod,format,slot,poller}.rs

// Удобные реэкспорты
pub use config::{PollerBuilder, PollerConfig};
pub use error::SnapshotError;
pub use snapshot::{
    PollOutcome, PollerHandle, SnapshotConsumer, SnapshotPoller, SnapshotSlot, StopSignal,
};
pub use table::{ChunkFlags, ChunkRecord, ChunkTable, TableSummary};
