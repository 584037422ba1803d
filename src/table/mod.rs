//! Chunk table — flat, growable, bit-packed store of per-chunk metadata.
//!
//! Разделение:
//! - packed.rs — кодирование/декодирование упакованного слова (size/garbage/flags).
//! - sort.rs   — упорядочивание по seq (quicksort, in place).
//!
//! Storage is an arena-style triple `(store, capacity, count)`: `store.len()` is the
//! allocated capacity (always a power of two), `count` is the logical prefix in use.
//! Capacity only grows; a smaller count reuses a prefix of the existing store.

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::consts::CODE_BYTE_SHIFT;
use crate::error::{Result, SnapshotError};

pub mod packed;
mod sort;

pub use packed::{decode_word, encode_word, ChunkFlags};

/// One slot of the store: sequence plus the packed size/garbage/flags word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PackedChunk {
    pub(crate) seq: i64,
    pub(crate) word: u64,
}

/// Unpacked view of a single chunk record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkRecord {
    /// Producer sequence; signed, ordered as the producer's `long`.
    pub seq: i64,
    pub size_code: u16,
    pub garbage_code: u16,
    pub flags: ChunkFlags,
}

impl ChunkRecord {
    pub fn new(seq: i64, size_code: u16, garbage_code: u16, flags: u8) -> Self {
        Self {
            seq,
            size_code,
            garbage_code,
            flags: ChunkFlags::from_bits_retain(flags),
        }
    }

    fn from_packed(p: &PackedChunk) -> Self {
        let (size_code, garbage_code, flags) = decode_word(p.word);
        Self::new(p.seq, size_code, garbage_code, flags)
    }

    fn to_packed(self) -> PackedChunk {
        PackedChunk {
            seq: self.seq,
            word: encode_word(self.size_code, self.garbage_code, self.flags.bits()),
        }
    }
}

/// Aggregate over all records of a table (used by CLI consumers).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct TableSummary {
    pub count: usize,
    pub total_size_bytes: u64,
    pub total_garbage_bytes: u64,
    pub selected: usize,
    pub survivors: usize,
    pub tombstones: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ChunkTable {
    store: Vec<PackedChunk>,
    count: usize,
}

impl ChunkTable {
    /// Empty table without any allocated capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with capacity for at least `records` (rounded up to a power of two).
    pub fn with_capacity(records: usize) -> Result<Self> {
        Ok(Self {
            store: new_store(records)?,
            count: 0,
        })
    }

    /// Grow-or-reuse decision. If `count` fits, the store is kept and only the logical
    /// count changes; otherwise the store is replaced by a fresh one sized to the next
    /// power of two >= `count` (at least 1). No data is copied: a full decode always follows.
    pub fn ensure_capacity(&mut self, count: usize) -> Result<()> {
        if count > self.capacity() || self.store.is_empty() {
            self.store = new_store(count)?;
        }
        self.count = count;
        Ok(())
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Decode `count` records from `r` (big-endian) into slots 0..count, then sort by seq.
    ///
    /// On a read failure the table content is unspecified; callers must not publish it.
    pub fn refresh_from<R: Read>(&mut self, r: &mut R) -> Result<()> {
        for slot in &mut self.store[..self.count] {
            let seq = r.read_i64::<BigEndian>().map_err(SnapshotError::TornRead)?;
            let size_code = r.read_u16::<BigEndian>().map_err(SnapshotError::TornRead)?;
            let garbage_code = r.read_u16::<BigEndian>().map_err(SnapshotError::TornRead)?;
            let flags = r.read_u8().map_err(SnapshotError::TornRead)?;
            *slot = PackedChunk {
                seq,
                word: encode_word(size_code, garbage_code, flags),
            };
        }
        self.sort_by_seq();
        Ok(())
    }

    /// Replace the content with `records` (sizing the store as needed) and sort.
    pub fn fill_from(&mut self, records: &[ChunkRecord]) -> Result<()> {
        self.ensure_capacity(records.len())?;
        for (slot, rec) in self.store.iter_mut().zip(records) {
            *slot = rec.to_packed();
        }
        self.sort_by_seq();
        Ok(())
    }

    pub fn sort_by_seq(&mut self) {
        sort::sort_by_seq(&mut self.store[..self.count]);
    }

    // ---------- accessors (panic on i >= len) ----------

    #[inline]
    fn slot(&self, i: usize) -> &PackedChunk {
        &self.store[..self.count][i]
    }

    #[inline]
    pub fn seq_at(&self, i: usize) -> i64 {
        self.slot(i).seq
    }

    /// Raw packed word of record `i`.
    #[inline]
    pub fn packed_at(&self, i: usize) -> u64 {
        self.slot(i).word
    }

    #[inline]
    pub fn size_code_at(&self, i: usize) -> u16 {
        packed::size_code_of(self.slot(i).word)
    }

    #[inline]
    pub fn garbage_code_at(&self, i: usize) -> u16 {
        packed::garbage_code_of(self.slot(i).word)
    }

    /// Chunk size in bytes (code scaled by 256).
    #[inline]
    pub fn size_at(&self, i: usize) -> u64 {
        (self.size_code_at(i) as u64) << CODE_BYTE_SHIFT
    }

    /// Garbage in bytes (code scaled by 256).
    #[inline]
    pub fn garbage_at(&self, i: usize) -> u64 {
        (self.garbage_code_at(i) as u64) << CODE_BYTE_SHIFT
    }

    /// Live bytes; saturates if the producer reported garbage > size.
    #[inline]
    pub fn live_at(&self, i: usize) -> u64 {
        self.size_at(i).saturating_sub(self.garbage_at(i))
    }

    #[inline]
    pub fn flags_at(&self, i: usize) -> ChunkFlags {
        ChunkFlags::from_bits_retain(packed::flags_of(self.slot(i).word))
    }

    #[inline]
    pub fn is_selected_at(&self, i: usize) -> bool {
        self.flags_at(i).contains(ChunkFlags::SELECTED)
    }

    #[inline]
    pub fn is_survivor_at(&self, i: usize) -> bool {
        self.flags_at(i).contains(ChunkFlags::SURVIVOR)
    }

    #[inline]
    pub fn is_tombstone_at(&self, i: usize) -> bool {
        self.flags_at(i).contains(ChunkFlags::TOMBSTONE)
    }

    /// Checked access.
    pub fn get(&self, i: usize) -> Result<ChunkRecord> {
        if i >= self.count {
            return Err(SnapshotError::OutOfRange {
                index: i,
                count: self.count,
            });
        }
        Ok(ChunkRecord::from_packed(&self.store[i]))
    }

    pub fn records(&self) -> impl Iterator<Item = ChunkRecord> + '_ {
        self.store[..self.count].iter().map(ChunkRecord::from_packed)
    }

    pub fn summary(&self) -> TableSummary {
        let mut s = TableSummary {
            count: self.count,
            ..TableSummary::default()
        };
        for i in 0..self.count {
            s.total_size_bytes += self.size_at(i);
            s.total_garbage_bytes += self.garbage_at(i);
            let f = self.flags_at(i);
            s.selected += f.contains(ChunkFlags::SELECTED) as usize;
            s.survivors += f.contains(ChunkFlags::SURVIVOR) as usize;
            s.tombstones += f.contains(ChunkFlags::TOMBSTONE) as usize;
        }
        s
    }
}

/// Least power of two >= `records` (1 for 0).
pub fn capacity_for(records: usize) -> Option<usize> {
    records.checked_next_power_of_two()
}

fn new_store(records: usize) -> Result<Vec<PackedChunk>> {
    let exhausted = || SnapshotError::CapacityExhausted { requested: records };
    let cap = capacity_for(records).ok_or_else(exhausted)?;
    let mut store = Vec::new();
    store.try_reserve_exact(cap).map_err(|_| exhausted())?;
    store.resize(cap, PackedChunk::default());
    Ok(store)
}
