//! Logging setup for the `parchment` binary
//!
//! Compact `LEVEL message` lines on stderr, no timestamps, no targets. The
//! library only emits `tracing` events and never installs a subscriber.
//!
//! ```rust
//! use parchment::logger;
//!
//! logger::init();
//! tracing::info!("rendering {}", "page.tpl");
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Initialize logging at `WARN`, the level that surfaces silent degradations
pub fn init() {
    init_with_level(LogLevel::Warn);
}

/// Initialize logging with a custom level
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_with_level(level: LogLevel) {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(level.into());

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    let _ = Registry::default().with(layer).try_init();
}

/// Initialize logging at `DEBUG`, used by `--verbose`
pub fn init_debug() {
    init_with_level(LogLevel::Debug);
}
