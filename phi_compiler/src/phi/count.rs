//! Grouping-variable count parsing
//!
//! The `n:` section takes only the first whitespace token of its text; extra
//! tokens are ignored, not an error. The count must be an integer >= 1.

use crate::log_error;
use crate::logging::{codes, Code};
use crate::phi::lists::first_token;

/// Grouping-variable count errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CountError {
    #[error("grouping variable count is not an integer: '{text}'")]
    Malformed { text: String },

    #[error("grouping variable count must be at least 1, got {value}")]
    NonPositive { value: i64 },
}

impl CountError {
    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            CountError::Malformed { .. } => codes::count::MALFORMED_COUNT,
            CountError::NonPositive { .. } => codes::count::NON_POSITIVE_COUNT,
        }
    }
}

/// Parse the declared grouping-variable count from the raw `n:` text
pub fn parse_grouping_var_count(text: &str) -> Result<u32, CountError> {
    let token = match first_token(text) {
        Some(token) => token,
        None => {
            let error = CountError::Malformed {
                text: text.trim().to_string(),
            };
            log_error!(error.error_code(), "Empty grouping variable count");
            return Err(error);
        }
    };

    let value: i64 = match token.parse() {
        Ok(value) => value,
        Err(_) => {
            let error = CountError::Malformed {
                text: token.to_string(),
            };
            log_error!(error.error_code(), "Grouping variable count is not an integer",
                "token" => token);
            return Err(error);
        }
    };

    if value < 1 {
        let error = CountError::NonPositive { value };
        log_error!(error.error_code(), "Grouping variable count below 1",
            "value" => value);
        return Err(error);
    }

    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_basic_count() {
        assert_eq!(parse_grouping_var_count("3").unwrap(), 3);
        assert_eq!(parse_grouping_var_count("  2  ").unwrap(), 2);
    }

    #[test]
    fn test_extra_tokens_ignored() {
        assert_eq!(parse_grouping_var_count("2 grouping variables").unwrap(), 2);
    }

    #[test]
    fn test_non_integer_rejected() {
        assert_matches!(
            parse_grouping_var_count("two").unwrap_err(),
            CountError::Malformed { ref text } if text == "two"
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_matches!(
            parse_grouping_var_count("   ").unwrap_err(),
            CountError::Malformed { .. }
        );
    }

    #[test]
    fn test_non_positive_rejected() {
        assert_matches!(
            parse_grouping_var_count("0").unwrap_err(),
            CountError::NonPositive { value: 0 }
        );
        assert_matches!(
            parse_grouping_var_count("-3").unwrap_err(),
            CountError::NonPositive { value: -3 }
        );
    }
}
