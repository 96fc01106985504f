//! Tracing subscriber setup

use crate::config::LoggingConfig;
use tracing::Level;

fn parse_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

/// Install a stderr fmt subscriber. Safe to call more than once.
pub fn init(config: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(&config.level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
