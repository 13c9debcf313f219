//! Error types for expression lexing and parsing

use crate::logging::{codes, Code};

/// Expression parsing errors. Positions are byte offsets into the predicate
/// or condition text being parsed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExprError {
    #[error("unexpected character '{character}' at offset {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("unterminated string literal starting at offset {position}")]
    UnterminatedString { position: usize },

    #[error("invalid number '{text}' at offset {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("malformed aggregate reference '{text}' at offset {position}. Expected like '1_sum_quant'")]
    InvalidAggregateRef { text: String, position: usize },

    #[error("unexpected token '{found}' at offset {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("expression ended unexpectedly")]
    UnexpectedEnd,

    #[error("expression nesting exceeds maximum depth {max}")]
    NestingTooDeep { max: usize },

    #[error("string literal too long: {length} characters (max: {max})")]
    StringTooLong { length: usize, max: usize },
}

impl ExprError {
    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            ExprError::UnexpectedCharacter { .. } => codes::expression::UNEXPECTED_CHARACTER,
            ExprError::UnterminatedString { .. } => codes::expression::UNTERMINATED_STRING,
            ExprError::InvalidNumber { .. } => codes::expression::INVALID_NUMBER,
            ExprError::InvalidAggregateRef { .. } => codes::expression::INVALID_AGGREGATE_REF,
            ExprError::UnexpectedToken { .. } => codes::expression::UNEXPECTED_TOKEN,
            ExprError::UnexpectedEnd => codes::expression::UNEXPECTED_END,
            ExprError::NestingTooDeep { .. } => codes::expression::NESTING_TOO_DEEP,
            ExprError::StringTooLong { .. } => codes::expression::STRING_TOO_LONG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let error = ExprError::UnexpectedEnd;
        assert_eq!(error.error_code().as_str(), "E054");

        let error = ExprError::InvalidAggregateRef {
            text: "1_foo_bar".to_string(),
            position: 0,
        };
        assert_eq!(error.error_code().as_str(), "E057");
    }
}
