//! Packed size/garbage/flags word (wire contract v1).
//!
//! Layout of the 64-bit word (bits outside 0..40 are always zero):
//!
//! ```text
//!  63        40 39          24 23             8 7       0
//! ┌────────────┬──────────────┬────────────────┬─────────┐
//! │  reserved  │  size_code   │  garbage_code  │  flags  │
//! └────────────┴──────────────┴────────────────┴─────────┘
//! ```
//!
//! The layout must match the producer bit for bit. Decoding is the exact inverse
//! of encoding for every `(u16, u16, u8)` triple.

use bitflags::bitflags;

use crate::consts::{
    FLAG_SELECTED, FLAG_SURVIVOR, FLAG_TOMBSTONE, PACKED_CODE_MASK, PACKED_FLAGS_MASK,
    PACKED_GARBAGE_SHIFT, PACKED_SIZE_SHIFT,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChunkFlags: u8 {
        /// Chunk is selected as a source of the current reclamation pass.
        const SELECTED  = FLAG_SELECTED;
        /// Chunk survived a prior reclamation pass.
        const SURVIVOR  = FLAG_SURVIVOR;
        /// Chunk holds only tombstones.
        const TOMBSTONE = FLAG_TOMBSTONE;
    }
}

#[inline]
pub fn encode_word(size_code: u16, garbage_code: u16, flags: u8) -> u64 {
    ((size_code as u64) << PACKED_SIZE_SHIFT)
        | ((garbage_code as u64) << PACKED_GARBAGE_SHIFT)
        | (flags as u64)
}

#[inline]
pub fn size_code_of(word: u64) -> u16 {
    ((word >> PACKED_SIZE_SHIFT) & PACKED_CODE_MASK) as u16
}

#[inline]
pub fn garbage_code_of(word: u64) -> u16 {
    ((word >> PACKED_GARBAGE_SHIFT) & PACKED_CODE_MASK) as u16
}

#[inline]
pub fn flags_of(word: u64) -> u8 {
    (word & PACKED_FLAGS_MASK) as u8
}

/// (size_code, garbage_code, flags)
#[inline]
pub fn decode_word(word: u64) -> (u16, u16, u8) {
    (size_code_of(word), garbage_code_of(word), flags_of(word))
}
