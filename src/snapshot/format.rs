//! Snapshot file format (producer-defined, big-endian).
//!
//! ```text
//! [stamp u64][count u32] then count × [seq i64][size_code u16][garbage_code u16][flags u8]
//! ```
//!
//! Reading is split in two steps the same way the poller consumes the file: the stamp
//! first (staleness gate), then the count and records.

use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::consts::{RECORD_SIZE, SNAPSHOT_HDR_SIZE};
use crate::error::SnapshotError;
use crate::table::{ChunkRecord, ChunkTable};

pub fn read_stamp<R: Read>(r: &mut R) -> Result<u64, SnapshotError> {
    r.read_u64::<BigEndian>().map_err(SnapshotError::TornRead)
}

pub fn read_count<R: Read>(r: &mut R) -> Result<u32, SnapshotError> {
    r.read_u32::<BigEndian>().map_err(SnapshotError::TornRead)
}

/// Reject a header whose declared records do not fit in `available` bytes (whole file).
pub fn check_declared_len(stamp: u64, count: u32, available: u64) -> Result<(), SnapshotError> {
    let need = expected_len(count);
    if available < need {
        return Err(SnapshotError::TornRead(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stamp {stamp}: header declares {count} records ({need} bytes), have {available}"),
        )));
    }
    Ok(())
}

/// One-shot decode of a complete snapshot image: (stamp, table sorted by seq).
///
/// The record body is buffered before the table is sized, so a torn header with a
/// huge count yields `TornRead` instead of an allocation of the declared size.
pub fn load_snapshot<R: Read>(r: &mut R) -> Result<(u64, ChunkTable), SnapshotError> {
    let stamp = read_stamp(r)?;
    let count = read_count(r)?;

    let body_len = expected_len(count) - SNAPSHOT_HDR_SIZE as u64;
    let mut body = Vec::new();
    r.take(body_len)
        .read_to_end(&mut body)
        .map_err(SnapshotError::TornRead)?;
    check_declared_len(stamp, count, SNAPSHOT_HDR_SIZE as u64 + body.len() as u64)?;

    let mut table = ChunkTable::new();
    table.ensure_capacity(count as usize)?;
    table.refresh_from(&mut body.as_slice())?;
    Ok((stamp, table))
}

/// Total file length implied by a header declaring `count` records.
pub fn expected_len(count: u32) -> u64 {
    SNAPSHOT_HDR_SIZE as u64 + count as u64 * RECORD_SIZE as u64
}

/// Encode a complete snapshot (header + records, in the given order).
pub fn encode_snapshot(stamp: u64, records: &[ChunkRecord]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SNAPSHOT_HDR_SIZE + records.len() * RECORD_SIZE);
    // запись в Vec не может завершиться ошибкой
    let _ = write_snapshot_to(&mut buf, stamp, records);
    buf
}

pub fn write_snapshot_to<W: Write>(w: &mut W, stamp: u64, records: &[ChunkRecord]) -> io::Result<()> {
    let count = u32::try_from(records.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many records for u32 count"))?;
    w.write_u64::<BigEndian>(stamp)?;
    w.write_u32::<BigEndian>(count)?;
    for rec in records {
        w.write_i64::<BigEndian>(rec.seq)?;
        w.write_u16::<BigEndian>(rec.size_code)?;
        w.write_u16::<BigEndian>(rec.garbage_code)?;
        w.write_u8(rec.flags.bits())?;
    }
    Ok(())
}

/// Rewrite the snapshot file in place (truncate + write), the way the producer does it:
/// no atomic rename, readers may observe a partial file.
pub fn write_snapshot_file(path: &Path, stamp: u64, records: &[ChunkRecord]) -> Result<()> {
    let bytes = encode_snapshot(stamp, records);
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("open snapshot for write {}", path.display()))?;
    f.write_all(&bytes)
        .with_context(|| format!("write snapshot {}", path.display()))?;
    f.flush()?;
    Ok(())
}
