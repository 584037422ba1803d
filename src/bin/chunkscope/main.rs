use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod util;
mod cmd_watch;
mod cmd_dump;
mod cmd_write;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug chunkscope watch --home ...
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Watch { home, file, short_ms, long_ms, json, max_updates } =>
            cmd_watch::exec(home, file, short_ms, long_ms, json, max_updates),

        cli::Cmd::Dump { home, file, json } =>
            cmd_dump::exec(home, file, json),

        cli::Cmd::Write { file, stamp, records } =>
            cmd_write::exec(file, stamp, records),
    }
}
