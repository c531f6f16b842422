//! logging — root loggers for the solver and calibration layers.
//!
//! Every component takes a `slog::Logger` argument; nothing logs through a
//! global. Binaries build one root with [`terminal_logger`], tests pass
//! [`discard_logger`].
use slog::{o, Discard, Drain, Level, LevelFilter, Logger};

/// Asynchronous stderr logger that drops records below `level`.
pub fn terminal_logger(level: Level) -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = LevelFilter::new(drain, level).fuse();
    Logger::root(drain, o!("crate" => env!("CARGO_PKG_NAME")))
}

pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}
