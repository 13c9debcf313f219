//! Error types for section scanning

use crate::logging::{codes, Code};

/// Section scanning errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SectionError {
    #[error("phi input must include section(s): {}", .sections.join(", "))]
    MissingSections { sections: Vec<String> },

    #[error("section '{section}' exceeds maximum length: {length} bytes (max: {max})")]
    SectionTooLarge {
        section: String,
        length: usize,
        max: usize,
    },

    #[error("too many sigma lines: {count} (max: {max})")]
    TooManySigmaLines { count: usize, max: usize },

    #[error("section '{section}' is present but has no value")]
    EmptySection { section: String },
}

impl SectionError {
    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            SectionError::MissingSections { .. } => codes::scanning::MISSING_SECTION,
            SectionError::SectionTooLarge { .. } => codes::scanning::SECTION_TOO_LARGE,
            SectionError::TooManySigmaLines { .. } => codes::scanning::TOO_MANY_SIGMA_LINES,
            SectionError::EmptySection { .. } => codes::scanning::EMPTY_SECTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_message() {
        let error = SectionError::MissingSections {
            sections: vec!["S".to_string(), "V".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("S, V"));
        assert_eq!(error.error_code().as_str(), "E020");
    }

    #[test]
    fn test_error_code_mapping() {
        let error = SectionError::TooManySigmaLines {
            count: 11,
            max: 10,
        };
        assert_eq!(error.error_code().as_str(), "E022");
    }
}
