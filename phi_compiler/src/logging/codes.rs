//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification
//! functions. This module combines code constants with their behavioral metadata
//! in one place.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Section scanning error codes
pub mod scanning {
    use super::Code;

    pub const MISSING_SECTION: Code = Code::new("E020");
    pub const SECTION_TOO_LARGE: Code = Code::new("E021");
    pub const TOO_MANY_SIGMA_LINES: Code = Code::new("E022");
    pub const EMPTY_SECTION: Code = Code::new("E023");
}

/// Grouping-variable count error codes
pub mod count {
    use super::Code;

    pub const MALFORMED_COUNT: Code = Code::new("E030");
    pub const NON_POSITIVE_COUNT: Code = Code::new("E031");
}

/// Aggregate recognition error codes
pub mod aggregates {
    use super::Code;

    pub const INVALID_AGGREGATE_TOKEN: Code = Code::new("E040");
    pub const TOO_MANY_AGGREGATES: Code = Code::new("E041");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E042");
}

/// Expression parsing error codes
pub mod expression {
    use super::Code;

    pub const UNEXPECTED_CHARACTER: Code = Code::new("E050");
    pub const UNTERMINATED_STRING: Code = Code::new("E051");
    pub const INVALID_NUMBER: Code = Code::new("E052");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E053");
    pub const UNEXPECTED_END: Code = Code::new("E054");
    pub const NESTING_TOO_DEEP: Code = Code::new("E055");
    pub const STRING_TOO_LONG: Code = Code::new("E056");
    pub const INVALID_AGGREGATE_REF: Code = Code::new("E057");
}

/// Having-clause decomposition error codes
pub mod having {
    use super::Code;

    pub const EMPTY_OR_BLOCK: Code = Code::new("E060");
    pub const TOO_MANY_OR_BLOCKS: Code = Code::new("E061");
    pub const TOO_MANY_CONDITIONS: Code = Code::new("E062");
}

/// Success codes
pub mod success {
    use super::Code;

    // General success codes
    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    // File processing success codes
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");

    // Stage success codes
    pub const PREPROCESSING_COMPLETE: Code = Code::new("I010");
    pub const SECTION_SCAN_COMPLETE: Code = Code::new("I020");
    pub const AGGREGATE_RECOGNITION_COMPLETE: Code = Code::new("I030");
    pub const PREDICATE_NORMALIZATION_COMPLETE: Code = Code::new("I040");
    pub const HAVING_DECOMPOSITION_COMPLETE: Code = Code::new("I050");
    pub const SPEC_ASSEMBLY_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "Contact system administrator or file bug report",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check system configuration and dependencies",
            ),
        );

        // File processing errors
        registry.insert(
            "E005",
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File not found at specified path",
                "Check file path and ensure file exists",
            ),
        );
        registry.insert(
            "E006",
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File does not have .phi extension",
                "Rename file with .phi extension or verify file type",
            ),
        );
        registry.insert(
            "E007",
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File exceeds maximum size limit",
                "Reduce file size or increase processing limits",
            ),
        );
        registry.insert(
            "E008",
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File is empty when content expected",
                "Provide a file with content or check file integrity",
            ),
        );
        registry.insert(
            "E009",
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Permission denied accessing file",
                "Check file permissions and user access rights",
            ),
        );
        registry.insert(
            "E010",
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Invalid UTF-8 encoding in file",
                "Convert file to UTF-8 encoding or fix encoding issues",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "I/O error during file operation",
                "Check disk space, permissions, and file system integrity",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Invalid file path provided",
                "Provide a valid file path",
            ),
        );

        // Section scanning errors
        registry.insert(
            "E020",
            ErrorMetadata::new(
                "E020",
                "Scanning",
                Severity::Medium,
                false,
                true,
                "Mandatory section missing from input",
                "Add the missing S:, n:, or V: section to the input file",
            ),
        );
        registry.insert(
            "E021",
            ErrorMetadata::new(
                "E021",
                "Scanning",
                Severity::Medium,
                false,
                true,
                "Section text exceeds maximum length",
                "Reduce the section value length or increase processing limits",
            ),
        );
        registry.insert(
            "E022",
            ErrorMetadata::new(
                "E022",
                "Scanning",
                Severity::Medium,
                false,
                true,
                "Too many sigma predicate lines",
                "Reduce the number of sigma lines or increase processing limits",
            ),
        );
        registry.insert(
            "E023",
            ErrorMetadata::new(
                "E023",
                "Scanning",
                Severity::Medium,
                false,
                true,
                "Mandatory section present but empty",
                "Provide a value after the section header",
            ),
        );

        // Grouping-variable count errors
        registry.insert(
            "E030",
            ErrorMetadata::new(
                "E030",
                "Count",
                Severity::Medium,
                false,
                true,
                "Grouping variable count is not an integer",
                "Provide an integer as the first token of the n: section",
            ),
        );
        registry.insert(
            "E031",
            ErrorMetadata::new(
                "E031",
                "Count",
                Severity::Medium,
                false,
                true,
                "Grouping variable count must be at least 1",
                "Declare one or more grouping variables in the n: section",
            ),
        );

        // Aggregate recognition errors
        registry.insert(
            "E040",
            ErrorMetadata::new(
                "E040",
                "Aggregates",
                Severity::Medium,
                false,
                true,
                "Aggregate token does not match the aggregate grammar",
                "Use the form <gv>_<func>_<column>, like 1_sum_quant",
            ),
        );
        registry.insert(
            "E041",
            ErrorMetadata::new(
                "E041",
                "Aggregates",
                Severity::Medium,
                false,
                true,
                "Too many aggregate tokens in F section",
                "Reduce the number of aggregates or increase processing limits",
            ),
        );
        registry.insert(
            "E042",
            ErrorMetadata::new(
                "E042",
                "Aggregates",
                Severity::Medium,
                false,
                true,
                "Aggregate column identifier exceeds maximum length",
                "Shorten the column identifier",
            ),
        );

        // Expression errors
        registry.insert(
            "E050",
            ErrorMetadata::new(
                "E050",
                "Expression",
                Severity::Medium,
                true,
                false,
                "Unexpected character in expression",
                "Remove or replace the invalid character",
            ),
        );
        registry.insert(
            "E051",
            ErrorMetadata::new(
                "E051",
                "Expression",
                Severity::Medium,
                true,
                false,
                "String literal not properly terminated",
                "Add the closing single quote to the string literal",
            ),
        );
        registry.insert(
            "E052",
            ErrorMetadata::new(
                "E052",
                "Expression",
                Severity::Medium,
                true,
                false,
                "Malformed numeric literal in expression",
                "Fix the numeric literal format",
            ),
        );
        registry.insert(
            "E053",
            ErrorMetadata::new(
                "E053",
                "Expression",
                Severity::Medium,
                true,
                false,
                "Unexpected token in expression",
                "Check the expression syntax near the reported position",
            ),
        );
        registry.insert(
            "E054",
            ErrorMetadata::new(
                "E054",
                "Expression",
                Severity::Medium,
                true,
                false,
                "Expression ended unexpectedly",
                "Complete the expression",
            ),
        );
        registry.insert(
            "E055",
            ErrorMetadata::new(
                "E055",
                "Expression",
                Severity::High,
                false,
                true,
                "Expression nesting exceeds maximum depth",
                "Flatten the expression or increase processing limits",
            ),
        );
        registry.insert(
            "E056",
            ErrorMetadata::new(
                "E056",
                "Expression",
                Severity::Medium,
                false,
                true,
                "String literal exceeds maximum length",
                "Shorten the string literal",
            ),
        );
        registry.insert(
            "E057",
            ErrorMetadata::new(
                "E057",
                "Expression",
                Severity::Medium,
                true,
                false,
                "Malformed aggregate reference in expression",
                "Use the form <gv>_<func>_<column>, like 1_sum_quant",
            ),
        );

        // Having-clause errors
        registry.insert(
            "E060",
            ErrorMetadata::new(
                "E060",
                "Having",
                Severity::Medium,
                false,
                true,
                "OR-block contains no conditions after splitting",
                "Remove doubled AND/OR separators from the G: section",
            ),
        );
        registry.insert(
            "E061",
            ErrorMetadata::new(
                "E061",
                "Having",
                Severity::Medium,
                false,
                true,
                "Too many OR-blocks in HAVING clause",
                "Reduce the number of OR-blocks or increase processing limits",
            ),
        );
        registry.insert(
            "E062",
            ErrorMetadata::new(
                "E062",
                "Having",
                Severity::Medium,
                false,
                true,
                "Too many AND-conditions in an OR-block",
                "Reduce the number of conditions or increase processing limits",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get complete metadata for an error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get the severity for an error code
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Medium)
}

/// Get the category for an error code
pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.category)
        .unwrap_or("Unknown")
}

/// Get the description for an error code
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown error")
}

/// Get the recommended action for an error code
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.recommended_action)
        .unwrap_or("No specific action available")
}

/// Check if an error code requires halting the pipeline
pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.requires_halt)
        .unwrap_or(false)
}

/// Check if an error code is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.recoverable)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        assert_eq!(file_processing::FILE_NOT_FOUND.as_str(), "E005");
        assert_eq!(format!("{}", scanning::MISSING_SECTION), "E020");
    }

    #[test]
    fn test_registry_lookup() {
        let metadata = get_error_metadata("E040").expect("E040 should be registered");
        assert_eq!(metadata.category, "Aggregates");
        assert!(metadata.requires_halt);
        assert!(!metadata.recoverable);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
        assert!(!requires_halt("E999"));
    }

    #[test]
    fn test_all_stage_codes_registered() {
        let codes = [
            scanning::MISSING_SECTION,
            count::MALFORMED_COUNT,
            count::NON_POSITIVE_COUNT,
            aggregates::INVALID_AGGREGATE_TOKEN,
            expression::UNEXPECTED_TOKEN,
            having::EMPTY_OR_BLOCK,
        ];
        for code in &codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }
}
