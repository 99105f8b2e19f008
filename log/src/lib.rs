use std::sync::Mutex;

use slog::{o, Discard, Drain, Fuse, Logger};
use slog_async::Async;
use slog_json::Json;

/// Builds the process-wide logger: JSON lines on stderr, written from a
/// background thread.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}

/// A logger that drops everything, for tests and tools.
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}
