//! Snapshot ingestion: file format, publication slot, live poller.
//!
//! - format.rs — заголовок (stamp, count) и кодирование снапшота продюсера.
//! - slot.rs   — публикация готовой таблицы читателям (одна подмена Arc).
//! - poller.rs — цикл опроса файла с паузами и восстановлением после torn read.

pub mod format;
pub mod poller;
pub mod slot;

pub use format::{
    check_declared_len, encode_snapshot, expected_len, load_snapshot, write_snapshot_file, write_snapshot_to,
};
pub use poller::{PollOutcome, PollerHandle, SnapshotPoller, StopSignal};
pub use slot::{SnapshotConsumer, SnapshotSlot};
