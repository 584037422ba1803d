use anyhow::Result;
use std::path::PathBuf;

use ChunkScope::snapshot::write_snapshot_file;

use crate::util::parse_records;

pub fn exec(file: PathBuf, stamp: u64, records: String) -> Result<()> {
    let recs = parse_records(&records)?;
    write_snapshot_file(&file, stamp, &recs)?;
    println!(
        "wrote {} (stamp={}, records={})",
        file.display(),
        stamp,
        recs.len()
    );
    Ok(())
}
