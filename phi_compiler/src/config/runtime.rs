// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Whether to require .phi extension (user preference, not security)
    pub require_phi_extension: bool,

    /// Whether to enable detailed performance logging (user preference)
    pub enable_performance_logging: bool,

    /// Whether to log debug information for non-phi files
    pub log_non_phi_processing: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_phi_extension: env::var("PHI_REQUIRE_PHI_EXTENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var("PHI_ENABLE_PERFORMANCE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_non_phi_processing: env::var("PHI_LOG_NON_PHI_PROCESSING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerPreferences {
    /// Whether to warn about continuation lines seen before any section header
    pub log_orphan_continuations: bool,

    /// Whether to log every section switch at debug level
    pub log_section_switches: bool,
}

impl Default for ScannerPreferences {
    fn default() -> Self {
        Self {
            log_orphan_continuations: env::var("PHI_SCANNER_LOG_ORPHANS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_section_switches: env::var("PHI_SCANNER_LOG_SWITCHES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionPreferences {
    /// Whether to include character positions in expression error messages
    pub include_position_in_errors: bool,
}

impl Default for ExpressionPreferences {
    fn default() -> Self {
        Self {
            include_position_in_errors: env::var("PHI_EXPR_INCLUDE_POSITIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

/// Runtime-selectable log level (maps onto the event log level)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn to_events_log_level(self) -> crate::logging::LogLevel {
        match self {
            LogLevel::Error => crate::logging::LogLevel::Error,
            LogLevel::Warning => crate::logging::LogLevel::Warning,
            LogLevel::Info => crate::logging::LogLevel::Info,
            LogLevel::Debug => crate::logging::LogLevel::Debug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to emit structured JSON events instead of console lines
    pub use_structured_logging: bool,

    /// Whether console logging is enabled at all
    pub enable_console_logging: bool,

    /// Minimum level to emit
    pub min_log_level: LogLevel,

    /// Whether to log per-stage performance events
    pub log_performance_events: bool,

    /// Whether to include the current file context in every event
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("PHI_LOG_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("PHI_LOG_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: match env::var("PHI_LOG_LEVEL").ok().as_deref() {
                Some("error") => LogLevel::Error,
                Some("warning") => LogLevel::Warning,
                Some("debug") => LogLevel::Debug,
                _ => LogLevel::Info,
            },
            log_performance_events: env::var("PHI_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_file_context: env::var("PHI_LOG_FILE_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = FileProcessorPreferences::default();
        // Environment-free defaults
        if std::env::var("PHI_REQUIRE_PHI_EXTENSION").is_err() {
            assert!(!prefs.require_phi_extension);
        }
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            LogLevel::Debug.to_events_log_level(),
            crate::logging::LogLevel::Debug
        );
        assert_eq!(
            LogLevel::Error.to_events_log_level(),
            crate::logging::LogLevel::Error
        );
    }
}
