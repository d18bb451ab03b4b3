//! Environment-derived logging configuration
//!
//! `RULESCAN_LOG` selects the minimum level (`error`, `warn`, `info`,
//! `debug`); `RULESCAN_LOG_FORMAT=json` switches to structured output.
//! The environment is read once and cached.

use super::events::LogLevel;
use std::sync::OnceLock;

const LEVEL_VAR: &str = "RULESCAN_LOG";
const FORMAT_VAR: &str = "RULESCAN_LOG_FORMAT";

static MIN_LEVEL: OnceLock<LogLevel> = OnceLock::new();
static STRUCTURED: OnceLock<bool> = OnceLock::new();

fn parse_level(value: &str) -> Option<LogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warning),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Minimum level events must meet to be emitted. Defaults to `Info`.
pub fn min_log_level() -> LogLevel {
    *MIN_LEVEL.get_or_init(|| {
        std::env::var(LEVEL_VAR)
            .ok()
            .and_then(|v| parse_level(&v))
            .unwrap_or(LogLevel::Info)
    })
}

/// Whether to emit JSON instead of human-readable lines.
pub fn use_structured_logging() -> bool {
    *STRUCTURED.get_or_init(|| {
        std::env::var(FORMAT_VAR)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_level("bogus"), None);
    }
}
