use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

use ChunkScope::{ChunkRecord, PollerConfig};

/// --home / --file / env -> poller config.
pub fn resolve_config(home: Option<PathBuf>, file: Option<PathBuf>) -> PollerConfig {
    let cfg = PollerConfig::from_env();
    match (home, file) {
        (_, Some(f)) => cfg.with_snapshot_path(f),
        (Some(h), None) => {
            let from_home = PollerConfig::for_home(h);
            cfg.with_snapshot_path(from_home.snapshot_path)
        }
        (None, None) => cfg,
    }
}

/// "seq:size:garbage:flags,..." -> records. Flags may be omitted (0).
pub fn parse_records(s: &str) -> Result<Vec<ChunkRecord>> {
    let mut out = Vec::new();
    for (idx, item) in s.split(',').map(str::trim).filter(|x| !x.is_empty()).enumerate() {
        let parts: Vec<&str> = item.split(':').collect();
        if parts.len() < 3 || parts.len() > 4 {
            return Err(anyhow!(
                "record #{} '{}': expected seq:size:garbage[:flags]",
                idx,
                item
            ));
        }
        let seq = parts[0]
            .parse::<i64>()
            .with_context(|| format!("record #{idx}: bad seq '{}'", parts[0]))?;
        let size = parts[1]
            .parse::<u16>()
            .with_context(|| format!("record #{idx}: bad size code '{}'", parts[1]))?;
        let garbage = parts[2]
            .parse::<u16>()
            .with_context(|| format!("record #{idx}: bad garbage code '{}'", parts[2]))?;
        let flags = match parts.get(3) {
            Some(f) => f
                .parse::<u8>()
                .with_context(|| format!("record #{idx}: bad flags '{f}'"))?,
            None => 0,
        };
        out.push(ChunkRecord::new(seq, size, garbage, flags));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_list() {
        let v = parse_records("30:100:10:1, 10:50:0").unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0], ChunkRecord::new(30, 100, 10, 1));
        assert_eq!(v[1], ChunkRecord::new(10, 50, 0, 0));
        assert_eq!(parse_records("-1:1:0").unwrap()[0].seq, -1);
        assert!(parse_records("").unwrap().is_empty());
        assert!(parse_records("1:2").is_err());
        assert!(parse_records("1:70000:0").is_err());
    }
}
