//! In-place ordering pass: quicksort by sequence with a midpoint pivot and
//! Hoare two-pointer partition. Records are swapped whole (seq + packed word).

use super::PackedChunk;

/// Sort `slots` ascending by `seq`. Empty and singleton ranges are no-ops.
pub(crate) fn sort_by_seq(slots: &mut [PackedChunk]) {
    if slots.len() < 2 {
        return;
    }
    quick_sort(slots, 0, slots.len() - 1);
}

fn quick_sort(slots: &mut [PackedChunk], mut lo: usize, mut hi: usize) {
    // Рекурсия только в меньшую половину: глубина стека O(log n).
    while lo < hi {
        let p = partition(slots, lo, hi);
        if p - lo < hi - p {
            quick_sort(slots, lo, p);
            lo = p + 1;
        } else {
            quick_sort(slots, p + 1, hi);
            hi = p;
        }
    }
}

/// Hoare partition over `lo..=hi`. Returns `j` with `lo <= j < hi` such that
/// every seq in `lo..=j` is <= every seq in `j+1..=hi`.
fn partition(slots: &mut [PackedChunk], lo: usize, hi: usize) -> usize {
    let pivot = slots[lo + (hi - lo) / 2].seq;
    let mut i = lo;
    let mut j = hi;
    loop {
        while slots[i].seq < pivot {
            i += 1;
        }
        while slots[j].seq > pivot {
            j -= 1;
        }
        if i >= j {
            return j;
        }
        slots.swap(i, j);
        i += 1;
        j -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_for(s: i64) -> u64 {
        (s as u64).wrapping_mul(0x9E37) & 0xff_ffff_ffff
    }

    fn chunks(seqs: &[i64]) -> Vec<PackedChunk> {
        seqs.iter()
            .map(|&s| PackedChunk { seq: s, word: word_for(s) })
            .collect()
    }

    fn seqs(v: &[PackedChunk]) -> Vec<i64> {
        v.iter().map(|c| c.seq).collect()
    }

    #[test]
    fn trivial_ranges() {
        let mut empty: Vec<PackedChunk> = Vec::new();
        sort_by_seq(&mut empty);
        assert!(empty.is_empty());

        let mut one = chunks(&[42]);
        sort_by_seq(&mut one);
        assert_eq!(seqs(&one), vec![42]);

        let mut two = chunks(&[9, 3]);
        sort_by_seq(&mut two);
        assert_eq!(seqs(&two), vec![3, 9]);
    }

    #[test]
    fn sorted_reversed_equal() {
        let asc: Vec<i64> = (-128..129).collect();
        let mut v = chunks(&asc);
        sort_by_seq(&mut v);
        assert_eq!(seqs(&v), asc);

        let desc: Vec<i64> = (-128..129).rev().collect();
        let mut v = chunks(&desc);
        sort_by_seq(&mut v);
        assert_eq!(seqs(&v), asc);

        let mut v = chunks(&[7; 100]);
        sort_by_seq(&mut v);
        assert!(v.iter().all(|c| c.seq == 7));
    }

    #[test]
    fn words_travel_with_their_seq() {
        let mut v = chunks(&[5, 1, 4, 1, 3, 9, 2, 6]);
        sort_by_seq(&mut v);
        for c in &v {
            assert_eq!(c.word, word_for(c.seq));
        }
        assert_eq!(seqs(&v), vec![1, 1, 2, 3, 4, 5, 6, 9]);
    }

    #[test]
    fn extreme_keys() {
        let mut v = chunks(&[i64::MAX, 0, -1, i64::MIN, 1, i64::MAX, 0]);
        sort_by_seq(&mut v);
        assert_eq!(seqs(&v), vec![i64::MIN, -1, 0, 0, 1, i64::MAX, i64::MAX]);
    }
}
