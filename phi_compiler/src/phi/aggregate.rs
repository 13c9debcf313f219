//! Aggregate grammar recognizer
//!
//! Matches each token of the tokenized `F:` list against the aggregate
//! grammar `<digits> '_' <func> '_' <column-or-*>` using an explicit
//! character scanner. Purely local per token; no cross-token state.

use crate::config::compile_time::aggregates::{MAX_AGGREGATE_COUNT, MAX_IDENTIFIER_LENGTH};
use crate::logging::{codes, Code};
use crate::phi::lists::split_list;
use crate::phi::nodes::{AggFunc, AggregateSpec, ColumnRef};
use crate::{log_error, log_success};
use std::iter::Peekable;
use std::str::Chars;

/// Aggregate recognition errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AggregateError {
    #[error("invalid aggregate token in F: '{token}'. Expected like '1_sum_quant'")]
    InvalidToken { token: String },

    #[error("too many aggregate tokens: {count} (max: {max})")]
    TooManyAggregates { count: usize, max: usize },

    #[error("aggregate column identifier too long: {length} characters (max: {max})")]
    IdentifierTooLong { length: usize, max: usize },
}

impl AggregateError {
    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            AggregateError::InvalidToken { .. } => codes::aggregates::INVALID_AGGREGATE_TOKEN,
            AggregateError::TooManyAggregates { .. } => codes::aggregates::TOO_MANY_AGGREGATES,
            AggregateError::IdentifierTooLong { .. } => codes::aggregates::IDENTIFIER_TOO_LONG,
        }
    }
}

/// Recognize every token of the `F:` section text as an aggregate request
pub fn recognize_aggregates(text: &str) -> Result<Vec<AggregateSpec>, AggregateError> {
    let tokens = split_list(text);

    if tokens.len() > MAX_AGGREGATE_COUNT {
        let error = AggregateError::TooManyAggregates {
            count: tokens.len(),
            max: MAX_AGGREGATE_COUNT,
        };
        log_error!(error.error_code(), "Too many aggregate tokens",
            "count" => tokens.len(),
            "max" => MAX_AGGREGATE_COUNT);
        return Err(error);
    }

    let mut aggregates = Vec::with_capacity(tokens.len());
    for token in &tokens {
        aggregates.push(parse_aggregate_token(token)?);
    }

    log_success!(codes::success::AGGREGATE_RECOGNITION_COMPLETE,
        "Aggregate recognition completed",
        "count" => aggregates.len());

    Ok(aggregates)
}

/// Parse a single aggregate token, canonicalizing the function name and
/// deriving the alias. Whitespace around the underscores is tolerated.
pub fn parse_aggregate_token(raw: &str) -> Result<AggregateSpec, AggregateError> {
    match scan_token(raw) {
        Ok(Some((grouping_var, function, column))) => {
            Ok(AggregateSpec::new(grouping_var, function, column))
        }
        Ok(None) => {
            let error = AggregateError::InvalidToken {
                token: raw.to_string(),
            };
            log_error!(error.error_code(), "Invalid aggregate token",
                "token" => raw,
                "expected" => "1_sum_quant");
            Err(error)
        }
        Err(error) => {
            log_error!(error.error_code(), "Aggregate token rejected",
                "token" => raw);
            Err(error)
        }
    }
}

/// Scan one token against the grammar. `Ok(None)` means the token does not
/// match; `Err` carries a limit violation.
fn scan_token(
    raw: &str,
) -> Result<Option<(String, AggFunc, ColumnRef)>, AggregateError> {
    let mut chars = raw.trim().chars().peekable();

    // <digits>
    let grouping_var = take_while(&mut chars, |c| c.is_ascii_digit());
    if grouping_var.is_empty() {
        return Ok(None);
    }

    skip_spaces(&mut chars);
    if chars.next() != Some('_') {
        return Ok(None);
    }
    skip_spaces(&mut chars);

    // <func>
    let func_word = take_while(&mut chars, |c| c.is_ascii_alphabetic());
    let function = match AggFunc::parse(&func_word) {
        Some(func) => func,
        None => return Ok(None),
    };

    skip_spaces(&mut chars);
    if chars.next() != Some('_') {
        return Ok(None);
    }
    skip_spaces(&mut chars);

    // <column> is an identifier or the literal `*`
    let column = match chars.peek().copied() {
        Some('*') => {
            chars.next();
            ColumnRef::Wildcard
        }
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            let ident = take_while(&mut chars, |c| c.is_ascii_alphanumeric() || c == '_');
            if ident.len() > MAX_IDENTIFIER_LENGTH {
                return Err(AggregateError::IdentifierTooLong {
                    length: ident.len(),
                    max: MAX_IDENTIFIER_LENGTH,
                });
            }
            ColumnRef::Named(ident)
        }
        _ => return Ok(None),
    };

    skip_spaces(&mut chars);
    if chars.next().is_some() {
        return Ok(None);
    }

    Ok(Some((grouping_var, function, column)))
}

fn take_while(chars: &mut Peekable<Chars<'_>>, pred: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if pred(c) {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    out
}

fn skip_spaces(chars: &mut Peekable<Chars<'_>>) {
    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
        chars.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_basic_token() {
        let spec = parse_aggregate_token("1_sum_quant").unwrap();
        assert_eq!(spec.grouping_var, "1");
        assert_eq!(spec.function, AggFunc::Sum);
        assert_eq!(spec.column, ColumnRef::Named("quant".to_string()));
        assert_eq!(spec.alias, "1_sum_quant");
    }

    #[test]
    fn test_function_case_canonicalized() {
        let spec = parse_aggregate_token("2_COUNT_*").unwrap();
        assert_eq!(spec.grouping_var, "2");
        assert_eq!(spec.function, AggFunc::Count);
        assert!(spec.column.is_wildcard());
        assert_eq!(spec.alias, "2_count_*");
    }

    #[test]
    fn test_whitespace_around_underscores_tolerated() {
        let spec = parse_aggregate_token("3 _ avg _ price").unwrap();
        assert_eq!(spec.alias, "3_avg_price");
    }

    #[test]
    fn test_wrong_separator_rejected() {
        let error = parse_aggregate_token("1-sum-quant").unwrap_err();
        assert_matches!(error, AggregateError::InvalidToken { ref token } if token == "1-sum-quant");
        assert!(error.to_string().contains("1_sum_quant"));
    }

    #[test]
    fn test_unknown_function_rejected() {
        assert_matches!(
            parse_aggregate_token("1_median_x").unwrap_err(),
            AggregateError::InvalidToken { .. }
        );
    }

    #[test]
    fn test_missing_pieces_rejected() {
        assert_matches!(
            parse_aggregate_token("sum_quant").unwrap_err(),
            AggregateError::InvalidToken { .. }
        );
        assert_matches!(
            parse_aggregate_token("1_sum_").unwrap_err(),
            AggregateError::InvalidToken { .. }
        );
        assert_matches!(
            parse_aggregate_token("1_sum_9col").unwrap_err(),
            AggregateError::InvalidToken { .. }
        );
    }

    #[test]
    fn test_underscore_leading_column_allowed() {
        let spec = parse_aggregate_token("1_sum__hidden").unwrap();
        assert_eq!(spec.column, ColumnRef::Named("_hidden".to_string()));
    }

    #[test]
    fn test_recognize_list() {
        let aggregates = recognize_aggregates("1_sum_quant, 2_avg_price 3_count_*").unwrap();
        assert_eq!(aggregates.len(), 3);
        assert_eq!(aggregates[0].alias, "1_sum_quant");
        assert_eq!(aggregates[1].alias, "2_avg_price");
        assert_eq!(aggregates[2].alias, "3_count_*");
    }

    #[test]
    fn test_recognize_stops_at_first_invalid() {
        let error = recognize_aggregates("1_sum_quant, nope").unwrap_err();
        assert_matches!(error, AggregateError::InvalidToken { ref token } if token == "nope");
    }
}
