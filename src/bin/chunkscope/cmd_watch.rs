use anyhow::{Context, Result};
use std::path::PathBuf;
use std::thread;

use log::info;

use ChunkScope::{metrics, ChunkTable, SnapshotPoller};

use crate::util::resolve_config;

pub fn exec(
    home: Option<PathBuf>,
    file: Option<PathBuf>,
    short_ms: Option<u64>,
    long_ms: Option<u64>,
    json: bool,
    max_updates: Option<u64>,
) -> Result<()> {
    let mut cfg = resolve_config(home, file);
    if let Some(ms) = short_ms {
        cfg = cfg.with_short_backoff_ms(ms);
    }
    if let Some(ms) = long_ms {
        cfg = cfg.with_long_backoff_ms(ms);
    }
    info!("watching {}", cfg.snapshot_path.display());
    let frame = cfg.short_backoff();

    let poller = SnapshotPoller::new(cfg).context("init poller")?;
    let handle = poller.spawn().context("spawn poller thread")?;
    let slot = handle.slot();

    // Потребитель: как рендер по кадрам — берёт последнюю опубликованную таблицу,
    // промежуточные поколения могут пропускаться.
    let mut seen_gen = 0u64;
    let mut updates = 0u64;
    while !handle.is_finished() {
        let gen = slot.generation();
        if gen != seen_gen {
            seen_gen = gen;
            if let Some(table) = slot.current() {
                print_update(&table, json);
                updates += 1;
            }
            if max_updates.is_some_and(|max| updates >= max) {
                break;
            }
        }
        thread::sleep(frame);
    }

    handle.stop().context("snapshot poller")?;

    let ms = metrics::snapshot();
    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({ "metrics": ms }))?);
    } else {
        println!(
            "polls={} published={} unchanged={} unavailable={} torn={} records={}",
            ms.polls_total,
            ms.snapshots_published,
            ms.snapshots_unchanged,
            ms.snapshots_unavailable,
            ms.torn_reads,
            ms.records_decoded
        );
    }
    Ok(())
}

fn print_update(table: &ChunkTable, json: bool) {
    let s = table.summary();
    if json {
        match serde_json::to_string(&s) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("serialize summary: {e}"),
        }
        return;
    }
    let (first, last) = if table.is_empty() {
        (0, 0)
    } else {
        (table.seq_at(0), table.seq_at(table.len() - 1))
    };
    println!(
        "chunks={} seq=[{}..{}] size={}B garbage={}B selected={} survivors={} tombstones={}",
        s.count,
        first,
        last,
        s.total_size_bytes,
        s.total_garbage_bytes,
        s.selected,
        s.survivors,
        s.tombstones
    );
}
