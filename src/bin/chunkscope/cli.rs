use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for tailing chunk snapshot files
#[derive(Parser, Debug)]
#[command(name = "chunkscope", version, about = "ChunkScope: live chunk snapshot reader")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Tail the snapshot file and print one summary per new stamp
    Watch {
        /// Store home directory (snapshot = <home>/chunk-snapshot.bin)
        #[arg(long, conflicts_with = "file")]
        home: Option<PathBuf>,
        /// Explicit snapshot file path
        #[arg(long)]
        file: Option<PathBuf>,
        /// Pause when the stamp did not change (default: env or 10)
        #[arg(long)]
        short_ms: Option<u64>,
        /// Pause after open failure / torn read (default: env or 200)
        #[arg(long)]
        long_ms: Option<u64>,
        /// Print JSONL instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Stop after this many published snapshots
        #[arg(long)]
        max_updates: Option<u64>,
    },
    /// Decode the snapshot once and print every record in sequence order
    Dump {
        #[arg(long, conflicts_with = "file")]
        home: Option<PathBuf>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write a snapshot file in the producer format (for manual testing)
    ///
    /// Records: "seq:size_code:garbage_code:flags,..." e.g. "30:100:10:1,10:50:0:2"
    Write {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        stamp: u64,
        #[arg(long, default_value = "")]
        records: String,
    },
}
