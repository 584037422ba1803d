// tests/chunk_table.rs
//
// Запуск только этого теста:
//   cargo test --test chunk_table -- --nocapture

use std::collections::HashMap;
use std::io::Cursor;

use anyhow::Result;
use oorandom::Rand64;

use ChunkScope::snapshot::{encode_snapshot, load_snapshot};
use ChunkScope::snapshot::format::{read_count, read_stamp};
use ChunkScope::table::capacity_for;
use ChunkScope::{ChunkRecord, ChunkTable};

/// Seqs are drawn from (-seq_span, seq_span): negatives included.
fn random_records(rng: &mut Rand64, n: usize, seq_span: i64) -> Vec<ChunkRecord> {
    (0..n)
        .map(|_| {
            ChunkRecord::new(
                rng.rand_i64() % seq_span,
                rng.rand_range(0..0x1_0000) as u16,
                rng.rand_range(0..0x1_0000) as u16,
                rng.rand_range(0..0x100) as u8,
            )
        })
        .collect()
}

/// Decode `records` through the wire format the same way the poller does.
fn decode_via_wire(table: &mut ChunkTable, records: &[ChunkRecord]) -> Result<()> {
    let bytes = encode_snapshot(1, records);
    let mut c = Cursor::new(bytes);
    read_stamp(&mut c)?;
    let count = read_count(&mut c)? as usize;
    table.ensure_capacity(count)?;
    table.refresh_from(&mut c)?;
    Ok(())
}

fn multiset(records: impl Iterator<Item = ChunkRecord>) -> HashMap<ChunkRecord, usize> {
    let mut m = HashMap::new();
    for r in records {
        *m.entry(r).or_insert(0) += 1;
    }
    m
}

fn assert_sorted_and_preserved(table: &ChunkTable, input: &[ChunkRecord]) {
    assert_eq!(table.len(), input.len());
    for i in 1..table.len() {
        assert!(
            table.seq_at(i - 1) <= table.seq_at(i),
            "order broken at {}: {} > {}",
            i,
            table.seq_at(i - 1),
            table.seq_at(i)
        );
    }
    assert_eq!(
        multiset(table.records()),
        multiset(input.iter().copied()),
        "records lost, duplicated or corrupted"
    );
}

#[test]
fn capacity_is_least_power_of_two_and_monotonic() -> Result<()> {
    let mut t = ChunkTable::new();
    let mut high = 0usize;
    for count in [0usize, 1, 2, 3, 7, 8, 9, 100, 1000, 1024, 1025, 4097] {
        t.ensure_capacity(count)?;
        high = high.max(count);
        assert_eq!(t.len(), count);
        assert_eq!(t.capacity(), capacity_for(high).unwrap(), "count={count}");
        assert!(t.capacity().is_power_of_two());
    }

    // non-increasing counts never shrink
    let cap = t.capacity();
    for count in [4000usize, 300, 5, 0] {
        t.ensure_capacity(count)?;
        assert_eq!(t.capacity(), cap);
        assert_eq!(t.len(), count);
    }
    Ok(())
}

#[test]
fn fresh_table_capacity_per_count() -> Result<()> {
    for count in 0usize..=300 {
        let mut t = ChunkTable::new();
        t.ensure_capacity(count)?;
        let cap = t.capacity();
        assert!(cap >= count && cap.is_power_of_two());
        assert!(cap == 1 || cap / 2 < count, "count={count} cap={cap} is not the least");
    }
    Ok(())
}

#[test]
fn decode_preserves_fields_through_wire() -> Result<()> {
    let mut rng = Rand64::new(0xC0FFEE);
    let input = random_records(&mut rng, 2000, i64::MAX);
    let mut t = ChunkTable::new();
    decode_via_wire(&mut t, &input)?;
    assert_sorted_and_preserved(&t, &input);
    for i in 0..t.len() {
        let r = t.get(i)?;
        assert_eq!(t.size_code_at(i), r.size_code);
        assert_eq!(t.garbage_code_at(i), r.garbage_code);
        assert_eq!(t.flags_at(i), r.flags);
    }
    Ok(())
}

#[test]
fn sort_small_sizes() -> Result<()> {
    let mut t = ChunkTable::new();
    decode_via_wire(&mut t, &[])?;
    assert!(t.is_empty());

    let one = [ChunkRecord::new(77, 1, 2, 3)];
    decode_via_wire(&mut t, &one)?;
    assert_sorted_and_preserved(&t, &one);

    let two = [ChunkRecord::new(9, 1, 0, 0), ChunkRecord::new(3, 2, 0, 1)];
    decode_via_wire(&mut t, &two)?;
    assert_sorted_and_preserved(&t, &two);
    assert_eq!((t.seq_at(0), t.seq_at(1)), (3, 9));

    let dup = [ChunkRecord::new(4, 1, 0, 0), ChunkRecord::new(4, 2, 0, 1)];
    decode_via_wire(&mut t, &dup)?;
    assert_sorted_and_preserved(&t, &dup);
    Ok(())
}

#[test]
fn high_bit_seq_decodes_negative_and_sorts_first() -> Result<()> {
    let recs = [
        ChunkRecord::new(5, 50, 0, 0),
        ChunkRecord::new(-1, 10, 0, 1),
        ChunkRecord::new(1, 20, 0, 2),
    ];
    let bytes = encode_snapshot(3, &recs);
    // -1 goes out as 0xFFFF_FFFF_FFFF_FFFF
    assert_eq!(&bytes[12 + 13..12 + 13 + 8], &[0xff; 8]);

    let (_, t) = load_snapshot(&mut Cursor::new(bytes))?;
    assert_eq!(
        (0..t.len()).map(|i| t.seq_at(i)).collect::<Vec<_>>(),
        vec![-1, 1, 5]
    );
    assert_eq!(t.size_code_at(0), 10);
    assert!(t.is_survivor_at(2));

    let mixed = [
        ChunkRecord::new(i64::MAX, 1, 0, 0),
        ChunkRecord::new(0, 2, 0, 0),
        ChunkRecord::new(i64::MIN, 3, 0, 0),
        ChunkRecord::new(-7, 4, 0, 0),
    ];
    let mut t = ChunkTable::new();
    decode_via_wire(&mut t, &mixed)?;
    assert_sorted_and_preserved(&t, &mixed);
    assert_eq!((t.seq_at(0), t.seq_at(3)), (i64::MIN, i64::MAX));
    Ok(())
}

#[test]
fn sort_sorted_reversed_and_equal_inputs() -> Result<()> {
    let n = 1500i64;
    let asc: Vec<ChunkRecord> = (0..n)
        .map(|s| ChunkRecord::new(s * 3, (s % 65536) as u16, 0, (s % 8) as u8))
        .collect();
    let desc: Vec<ChunkRecord> = asc.iter().rev().copied().collect();
    let equal: Vec<ChunkRecord> = (0..n)
        .map(|s| ChunkRecord::new(42, (s % 65536) as u16, (s / 2) as u16, 0))
        .collect();

    let mut t = ChunkTable::new();
    for input in [&asc, &desc, &equal] {
        decode_via_wire(&mut t, input)?;
        assert_sorted_and_preserved(&t, input);
    }
    Ok(())
}

#[test]
fn sort_random_with_many_duplicates() -> Result<()> {
    let mut rng = Rand64::new(0xDEADBEEF);
    let mut t = ChunkTable::new();
    for round in 0..20 {
        let n = 1000 + (rng.rand_range(0..4000) as usize);
        // narrow key range -> lots of equal seqs
        let input = random_records(&mut rng, n, 50 + round * 10);
        decode_via_wire(&mut t, &input)?;
        assert_sorted_and_preserved(&t, &input);
    }
    Ok(())
}

#[test]
fn reuse_after_shrink_decodes_only_prefix() -> Result<()> {
    let mut rng = Rand64::new(7);
    let mut t = ChunkTable::new();
    let big = random_records(&mut rng, 3000, 1 << 40);
    decode_via_wire(&mut t, &big)?;
    let cap = t.capacity();

    let small = random_records(&mut rng, 10, 1 << 40);
    decode_via_wire(&mut t, &small)?;
    assert_eq!(t.capacity(), cap);
    assert_sorted_and_preserved(&t, &small);
    assert!(t.get(10).is_err());
    Ok(())
}
