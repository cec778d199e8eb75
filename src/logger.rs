use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Log to stderr as `<local time> <LEVEL> [file:line] message`.
/// Info by default, debug when verbose; RUST_LOG overrides both.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}:{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args(),
            )
        })
        .init();
}
