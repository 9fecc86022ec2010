//! Logging setup.
//!
//! The style is picked once at startup. `RUST_LOG` overrides the level chosen
//! by `--verbose`.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogStyle {
    /// Bare messages, no colour.
    Plain,
    /// Level, timestamp and colour.
    Rich,
}

impl LogStyle {
    /// `Rich` when stderr is a terminal, `Plain` otherwise.
    pub fn detect() -> Self {
        if std::io::stderr().is_terminal() {
            LogStyle::Rich
        } else {
            LogStyle::Plain
        }
    }
}

/// Installs the global subscriber, writing to stderr.
pub fn init(style: LogStyle, verbose: bool) {
    let level = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    match style {
        LogStyle::Plain => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_level(false)
            .with_ansi(false)
            .init(),
        LogStyle::Rich => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
            .init(),
    }
}
