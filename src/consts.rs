//! Fixed constants of the chunk snapshot format (producer contract) and poller defaults.

// -------- Snapshot file --------
pub const SNAPSHOT_FILE: &str = "chunk-snapshot.bin";

// Header (big-endian): [stamp u64][count u32]
pub const SNAPSHOT_HDR_SIZE: usize = 12;

// Record (big-endian): [seq i64][size_code u16][garbage_code u16][flags u8]
pub const RECORD_SIZE: usize = 13;

/// Stamp value the producer never emits; the poller starts from it.
pub const NO_STAMP: u64 = 0;

// -------- Packed word (wire contract v1) --------
// bits [39:24] size_code, [23:8] garbage_code, [7:0] flags
pub const PACKED_SIZE_SHIFT: u32 = 24;
pub const PACKED_GARBAGE_SHIFT: u32 = 8;
pub const PACKED_CODE_MASK: u64 = 0xffff;
pub const PACKED_FLAGS_MASK: u64 = 0xff;

/// Codes are magnitudes in units of 256 bytes.
pub const CODE_BYTE_SHIFT: u32 = 8;

// -------- Flag bits --------
pub const FLAG_SELECTED: u8 = 1;
pub const FLAG_SURVIVOR: u8 = 1 << 1;
pub const FLAG_TOMBSTONE: u8 = 1 << 2;

// -------- Poller defaults --------
pub const DEFAULT_SHORT_BACKOFF_MS: u64 = 10;
pub const DEFAULT_LONG_BACKOFF_MS: u64 = 200;
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;
