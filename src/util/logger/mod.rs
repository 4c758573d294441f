//! 日志初始化
//!
//! Diagnostics from the compiler phases go through `tracing`; the CLI
//! installs a compact `[LEVEL] message` subscriber on stderr so program
//! output on stdout stays clean.
//!
//! ```rust
//! use sapling::util::logger::{self, LogLevel};
//!
//! logger::init(LogLevel::select(false, None));
//! tracing::warn!("only warnings and errors are shown");
//! ```

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// How much of the pipeline to log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    /// Warnings only
    Warn,
    /// Phase boundaries (`info!`)
    Info,
    /// Per-token, per-statement and per-function events
    Debug,
    /// Scope declarations and emitted instructions
    Trace,
}

impl LogLevel {
    /// An explicit level wins; otherwise `--verbose` means `Debug`
    pub fn select(
        verbose: bool,
        explicit: Option<LogLevel>,
    ) -> LogLevel {
        match (explicit, verbose) {
            (Some(level), _) => level,
            (None, true) => LogLevel::Debug,
            (None, false) => LogLevel::Warn,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the stderr subscriber. Returns `false` when one was already
/// installed.
pub fn init(level: LogLevel) -> bool {
    // [LEVEL] 前缀，无时间、无模块路径、无颜色
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_filter(LevelFilter::from(level));

    Registry::default().with(layer).try_init().is_ok()
}
