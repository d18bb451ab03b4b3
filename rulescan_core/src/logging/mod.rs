//! Global logging for the scanning engine
//!
//! Thread-safe global logging with coded events and a clean macro
//! interface. The global service is optional; when it was never
//! initialized the logging helpers are no-ops, so library users who bring
//! their own logging pay nothing.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::utils::Region;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Initialize global logging from the environment
pub fn init_global_logging() -> Result<(), String> {
    init_global_logging_with(Arc::new(LoggingService::with_config()))
}

/// Initialize global logging with a caller-built service
pub fn init_global_logging_with(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Get the global logger if one was initialized
pub fn try_get_global_logger() -> Option<Arc<LoggingService>> {
    GLOBAL_LOGGER.get().cloned()
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

pub fn log_error_with_context(
    code: Code,
    message: &str,
    region: Option<Region>,
    context: Vec<(&str, &str)>,
) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::error(code, message);
        if let Some(region) = region {
            event = event.with_region(region);
        }
        for (key, value) in context {
            event = event.with_context(key, value);
        }
        logger.log_event(event);
    }
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::success(code, message);
        for (key, value) in context {
            event = event.with_context(key, value);
        }
        logger.log_event(event);
    }
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::info(message);
        for (key, value) in context {
            event = event.with_context(key, value);
        }
        logger.log_event(event);
    }
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::debug(message);
        for (key, value) in context {
            event = event.with_context(key, value);
        }
        logger.log_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_are_noops_without_global_logger() {
        // must not panic when no logger was initialized
        log_info_with_context("nothing listens", vec![("k", "v")]);
        log_debug_with_context("still nothing", vec![]);
    }
}
