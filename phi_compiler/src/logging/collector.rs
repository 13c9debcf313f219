//! Error collector for file processing with cargo-style output
//!
//! Provides organized error collection and reporting across parse invocations

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

/// Context information for file processing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

/// Summary of processing results across parsed files
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe error collector
pub struct ErrorCollector {
    /// Events organized by file path for cargo-style output
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,

    /// Processing contexts for timing information
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,

    /// Global processing start time
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event for a specific file
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.file_events.lock().unwrap();

        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            let summary_event = LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            ));
            file_events.push(summary_event);
        }
    }

    /// Record file processing context
    pub fn record_file_context(&self, context: FileProcessingContext) {
        let mut contexts = self.file_contexts.lock().unwrap();
        contexts.insert(context.file_path.clone(), context);
    }

    /// Get all events for a specific file
    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        let events = self.file_events.lock().unwrap();
        events.get(file_path).cloned().unwrap_or_default()
    }

    /// Get errors for a specific file
    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        let events = self.file_events.lock().unwrap();
        events
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    /// Get processing summary
    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.file_events.lock().unwrap();

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        for file_events in events.values() {
            let error_count = file_events.iter().filter(|e| e.is_error()).count();
            let warning_count = file_events.iter().filter(|e| e.is_warning()).count();

            summary.total_errors += error_count;
            summary.total_warnings += warning_count;

            if error_count > 0 {
                summary.failed_files += 1;
            } else if warning_count > 0 {
                summary.files_with_warnings += 1;
            } else {
                summary.successful_files += 1;
            }
        }

        summary
    }

    /// Clear all collected events and contexts
    pub fn clear(&self) {
        self.file_events.lock().unwrap().clear();
        self.file_contexts.lock().unwrap().clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Format collected errors in cargo style, grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let all_events = collector.file_events.lock().unwrap();
    let mut output = String::new();

    for (file_path, events) in all_events.iter() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("{}:\n", file_path.display()));

        for event in &errors {
            let span_str = event
                .span
                .as_ref()
                .map(|s| format!("{}:{}: ", s.start().line, s.start().column))
                .unwrap_or_default();
            output.push_str(&format!(
                "  error[{}]: {}{}\n",
                event.code.as_str(),
                span_str,
                event.message
            ));
        }

        for event in &warnings {
            output.push_str(&format!("  warning: {}\n", event.message));
        }
    }

    let summary = collector.get_summary();
    if summary.has_errors() || summary.has_warnings() {
        output.push_str(&format!(
            "\n{} error(s), {} warning(s) across {} file(s)\n",
            summary.total_errors, summary.total_warnings, summary.total_files
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_record_and_retrieve_events() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("query.phi");

        collector.record_event(
            &path,
            LogEvent::error(codes::scanning::MISSING_SECTION, "missing S"),
        );
        collector.record_event(&path, LogEvent::warning("orphan continuation"));

        assert_eq!(collector.get_file_events(&path).len(), 2);
        assert_eq!(collector.get_file_errors(&path).len(), 1);
    }

    #[test]
    fn test_summary_counts() {
        let collector = ErrorCollector::new();
        let bad = PathBuf::from("bad.phi");
        let warned = PathBuf::from("warned.phi");

        collector.record_event(
            &bad,
            LogEvent::error(codes::count::MALFORMED_COUNT, "not an integer"),
        );
        collector.record_event(&warned, LogEvent::warning("orphan continuation"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("query.phi");

        collector.record_event(
            &path,
            LogEvent::error(codes::aggregates::INVALID_AGGREGATE_TOKEN, "bad token"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("query.phi"));
        assert!(output.contains("error[E040]"));
        assert!(output.contains("bad token"));
    }
}
