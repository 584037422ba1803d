use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use ChunkScope::snapshot::load_snapshot;

use crate::util::resolve_config;

pub fn exec(home: Option<PathBuf>, file: Option<PathBuf>, json: bool) -> Result<()> {
    let cfg = resolve_config(home, file);
    let path = cfg.snapshot_path;
    let f = File::open(&path).with_context(|| format!("open snapshot {}", path.display()))?;
    let (stamp, table) = load_snapshot(&mut BufReader::new(f))
        .with_context(|| format!("decode snapshot {}", path.display()))?;

    if json {
        let records: Vec<serde_json::Value> = table
            .records()
            .map(|r| {
                serde_json::json!({
                    "seq": r.seq,
                    "size_code": r.size_code,
                    "garbage_code": r.garbage_code,
                    "selected": r.flags.contains(ChunkScope::ChunkFlags::SELECTED),
                    "survivor": r.flags.contains(ChunkScope::ChunkFlags::SURVIVOR),
                    "tombstone": r.flags.contains(ChunkScope::ChunkFlags::TOMBSTONE),
                })
            })
            .collect();
        let out = serde_json::json!({
            "stamp": stamp,
            "summary": table.summary(),
            "records": records,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("stamp:  {}", stamp);
    println!("chunks: {}", table.len());
    println!("{:>20} {:>12} {:>12} {:>5}", "seq", "size", "garbage", "flags");
    for i in 0..table.len() {
        let marks = format!(
            "{}{}{}",
            if table.is_selected_at(i) { 'S' } else { '-' },
            if table.is_survivor_at(i) { 'V' } else { '-' },
            if table.is_tombstone_at(i) { 'T' } else { '-' },
        );
        println!(
            "{:>20} {:>12} {:>12} {:>5}",
            table.seq_at(i),
            table.size_at(i),
            table.garbage_at(i),
            marks
        );
    }
    Ok(())
}
