//! Having-clause decomposer
//!
//! Splits the `G:` section into OR-separated blocks, each further split into
//! AND-separated conditions, preserving order. Splitting happens on the
//! standalone words `OR`/`AND` (case-insensitive) after whitespace
//! normalization; each surviving condition is parsed into the expression AST,
//! where aggregate aliases and bare attributes become field references.
//!
//! Empty condition strings produced by doubled separators are dropped; an
//! OR-block left with no conditions at all is rejected.

use crate::config::compile_time::having::{MAX_CONDITIONS_PER_BLOCK, MAX_OR_BLOCKS};
use crate::expr::error::ExprError;
use crate::expr::parser::parse_expression;
use crate::logging::{codes, Code};
use crate::phi::nodes::{HavingClause, HavingCondition};
use crate::{log_error, log_success};

/// Having-clause decomposition errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum HavingError {
    #[error("HAVING OR-block {index} contains no conditions")]
    EmptyOrBlock { index: usize },

    #[error("too many OR-blocks in HAVING clause: {count} (max: {max})")]
    TooManyOrBlocks { count: usize, max: usize },

    #[error("too many conditions in HAVING OR-block: {count} (max: {max})")]
    TooManyConditions { count: usize, max: usize },

    #[error("invalid HAVING condition '{condition}': {source}")]
    Condition {
        condition: String,
        #[source]
        source: ExprError,
    },
}

impl HavingError {
    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            HavingError::EmptyOrBlock { .. } => codes::having::EMPTY_OR_BLOCK,
            HavingError::TooManyOrBlocks { .. } => codes::having::TOO_MANY_OR_BLOCKS,
            HavingError::TooManyConditions { .. } => codes::having::TOO_MANY_CONDITIONS,
            HavingError::Condition { source, .. } => source.error_code(),
        }
    }
}

/// Decompose the raw `G:` text into the OR-of-AND having structure
pub fn decompose_having(text: &str) -> Result<Vec<HavingClause>, HavingError> {
    // Collapse whitespace runs to single spaces and trim
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let or_blocks = split_on_word(&words, "or");
    if or_blocks.len() > MAX_OR_BLOCKS {
        let error = HavingError::TooManyOrBlocks {
            count: or_blocks.len(),
            max: MAX_OR_BLOCKS,
        };
        log_error!(error.error_code(), "Too many OR-blocks in HAVING clause",
            "count" => or_blocks.len(),
            "max" => MAX_OR_BLOCKS);
        return Err(error);
    }

    let mut having = Vec::with_capacity(or_blocks.len());

    for (index, block) in or_blocks.iter().enumerate() {
        let mut clause: HavingClause = Vec::new();

        for group in split_on_word(block, "and") {
            let source = group.join(" ");
            if source.is_empty() {
                // Doubled separators leave empty condition strings behind
                continue;
            }

            let expr = parse_expression(&source).map_err(|source_error| {
                let error = HavingError::Condition {
                    condition: source.clone(),
                    source: source_error,
                };
                log_error!(error.error_code(), "Invalid HAVING condition",
                    "condition" => source,
                    "or_block" => index);
                error
            })?;

            clause.push(HavingCondition { source, expr });
        }

        if clause.is_empty() {
            let error = HavingError::EmptyOrBlock { index };
            log_error!(error.error_code(), "HAVING OR-block has no conditions",
                "or_block" => index);
            return Err(error);
        }

        if clause.len() > MAX_CONDITIONS_PER_BLOCK {
            let error = HavingError::TooManyConditions {
                count: clause.len(),
                max: MAX_CONDITIONS_PER_BLOCK,
            };
            log_error!(error.error_code(), "Too many conditions in HAVING OR-block",
                "count" => clause.len(),
                "max" => MAX_CONDITIONS_PER_BLOCK);
            return Err(error);
        }

        having.push(clause);
    }

    log_success!(codes::success::HAVING_DECOMPOSITION_COMPLETE,
        "Having decomposition completed",
        "or_blocks" => having.len());

    Ok(having)
}

/// Group words between case-insensitive standalone occurrences of `separator`
fn split_on_word<'a>(words: &[&'a str], separator: &str) -> Vec<Vec<&'a str>> {
    let mut groups: Vec<Vec<&'a str>> = vec![Vec::new()];
    for word in words {
        if word.eq_ignore_ascii_case(separator) {
            groups.push(Vec::new());
        } else {
            groups.last_mut().expect("at least one group").push(word);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sources(clauses: &[HavingClause]) -> Vec<Vec<&str>> {
        clauses
            .iter()
            .map(|clause| clause.iter().map(|c| c.source.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_or_of_and_decomposition() {
        let having = decompose_having("1_sum_quant > 100 AND month = 1 OR 2_count_* < 5").unwrap();
        assert_eq!(
            sources(&having),
            vec![vec!["1_sum_quant > 100", "month = 1"], vec!["2_count_* < 5"]]
        );
    }

    #[test]
    fn test_field_rewriting_into_ast() {
        let having = decompose_having("1_sum_quant > 100 AND month = 1 OR 2_count_* < 5").unwrap();
        assert_eq!(having[0][0].expr.referenced_fields(), vec!["1_sum_quant"]);
        assert_eq!(having[0][1].expr.referenced_fields(), vec!["month"]);
        assert_eq!(having[1][0].expr.referenced_fields(), vec!["2_count_*"]);
    }

    #[test]
    fn test_split_is_case_insensitive() {
        let upper = decompose_having("a > 1 AND b < 2 OR c = 3").unwrap();
        let lower = decompose_having("a > 1 and b < 2 or c = 3").unwrap();
        assert_eq!(sources(&upper), sources(&lower));
    }

    #[test]
    fn test_whitespace_runs_collapsed() {
        let having = decompose_having("  a   >  1   AND\t b = 2 ").unwrap();
        assert_eq!(sources(&having), vec![vec!["a > 1", "b = 2"]]);
    }

    #[test]
    fn test_single_condition() {
        let having = decompose_having("1_avg_price >= 10.5").unwrap();
        assert_eq!(sources(&having), vec![vec!["1_avg_price >= 10.5"]]);
    }

    #[test]
    fn test_reserved_words_keep_logical_meaning() {
        // `not` and boolean literals stay operators/literals, never fields
        let having = decompose_having("not closed AND active = True").unwrap();
        assert_eq!(having[0][0].expr.referenced_fields(), vec!["closed"]);
        assert_eq!(having[0][1].expr.referenced_fields(), vec!["active"]);
    }

    #[test]
    fn test_doubled_and_drops_empty_condition() {
        let having = decompose_having("a > 1 AND AND b < 2").unwrap();
        assert_eq!(sources(&having), vec![vec!["a > 1", "b < 2"]]);
    }

    #[test]
    fn test_empty_or_block_rejected() {
        let error = decompose_having("a > 1 OR OR b < 2").unwrap_err();
        assert_matches!(error, HavingError::EmptyOrBlock { index: 1 });
    }

    #[test]
    fn test_unparseable_condition_rejected() {
        let error = decompose_having("a > 1 AND b <").unwrap_err();
        assert_matches!(error, HavingError::Condition { ref condition, .. } if condition == "b <");
    }

    #[test]
    fn test_empty_text_yields_no_clauses() {
        assert!(decompose_having("   ").unwrap().is_empty());
    }
}
