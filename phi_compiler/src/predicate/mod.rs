//! Predicate normalizer
//!
//! Maps each accumulated `sigma:` line to a grouping-variable id and its
//! predicate. Labeled lines (`<digits><sep><text>`, sep a run of `:`, `-`,
//! `>`, space) record or overwrite the entry for that id. Unlabeled lines
//! belong to id "1"; when "1" already holds a predicate the two are combined
//! with a parenthesized logical AND, so predicate order determines the final
//! AND-nesting. That fallback-merge is an explicit, observable rule.

use crate::expr::ast::{BinaryOp, Expr};
use crate::expr::error::ExprError;
use crate::expr::parser::parse_expression;
use crate::logging::{codes, Code};
use crate::phi::nodes::Predicate;
use crate::{log_error, log_success};
use std::collections::BTreeMap;

/// Predicate normalization errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PredicateError {
    #[error("invalid predicate for grouping variable {grouping_var}: {source}")]
    Expression {
        grouping_var: String,
        #[source]
        source: ExprError,
    },
}

impl PredicateError {
    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            PredicateError::Expression { source, .. } => source.error_code(),
        }
    }
}

/// Normalize sigma lines into the grouping-variable-id -> predicate mapping
pub fn normalize_sigma_lines(
    lines: &[String],
) -> Result<BTreeMap<String, Predicate>, PredicateError> {
    let mut predicates: BTreeMap<String, Predicate> = BTreeMap::new();

    for line in lines {
        match split_labeled(line) {
            Some((grouping_var, text)) => {
                let expr = parse_predicate(text, &grouping_var)?;
                predicates.insert(
                    grouping_var,
                    Predicate {
                        source: text.to_string(),
                        expr,
                    },
                );
            }
            None => {
                let text = line.trim();
                let expr = parse_predicate(text, "1")?;
                match predicates.remove("1") {
                    Some(existing) => {
                        let combined = Predicate {
                            source: format!("({}) and ({})", existing.source, text),
                            expr: Expr::binary(BinaryOp::And, existing.expr, expr),
                        };
                        predicates.insert("1".to_string(), combined);
                    }
                    None => {
                        predicates.insert(
                            "1".to_string(),
                            Predicate {
                                source: text.to_string(),
                                expr,
                            },
                        );
                    }
                }
            }
        }
    }

    log_success!(codes::success::PREDICATE_NORMALIZATION_COMPLETE,
        "Predicate normalization completed",
        "grouping_vars" => predicates.len());

    Ok(predicates)
}

fn parse_predicate(text: &str, grouping_var: &str) -> Result<Expr, PredicateError> {
    parse_expression(text).map_err(|source| {
        let error = PredicateError::Expression {
            grouping_var: grouping_var.to_string(),
            source,
        };
        log_error!(error.error_code(), "Invalid sigma predicate",
            "grouping_var" => grouping_var,
            "predicate" => text);
        error
    })
}

/// Split a sigma line into grouping-variable id and predicate text. Returns
/// None when no leading id is detected; the caller then applies the id "1"
/// fallback to the whole line.
fn split_labeled(line: &str) -> Option<(String, &str)> {
    let trimmed = line.trim();

    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digits_end == 0 {
        return None;
    }

    let after = &trimmed[digits_end..];
    let sep_end = after
        .find(|c: char| !matches!(c, ':' | '-' | '>' | ' '))
        .unwrap_or(after.len());
    if sep_end == 0 {
        return None;
    }

    let rest = after[sep_end..].trim();
    if rest.is_empty() {
        return None;
    }

    Some((trimmed[..digits_end].to_string(), rest))
}
