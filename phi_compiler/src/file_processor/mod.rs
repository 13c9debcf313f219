//! File processing module
//!
//! Reads phi input files with path validation, metadata collection, and
//! compile-time size boundaries before the parsing pipeline begins.

pub mod processor;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError,
};

use crate::config::runtime::FileProcessorPreferences;

/// Process a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    let processor = FileProcessor::new();
    processor.process_file(file_path)
}

/// Create a file processor from runtime preferences
pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}
