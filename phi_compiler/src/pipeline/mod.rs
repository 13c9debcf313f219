//! Parsing pipeline
//!
//! Strictly sequential stages: file -> preprocess -> section scan ->
//! tokenize/recognize/normalize/decompose -> assembled PhiSpec. No stage
//! loops back into an earlier one, and no state survives between calls.

mod error;
mod result;

pub use error::PhiParseError;
pub use result::ParseResult;

use crate::file_processor;
use crate::having::decompose_having;
use crate::log_info;
use crate::logging;
use crate::phi::aggregate::recognize_aggregates;
use crate::phi::count::parse_grouping_var_count;
use crate::phi::lists::split_list;
use crate::phi::nodes::PhiSpec;
use crate::predicate::normalize_sigma_lines;
use crate::preprocess::preprocess_source;
use crate::sections::{self, RawSections, SectionError};
use std::path::PathBuf;
use std::time::Instant;

/// Process a single file through the complete pipeline
pub fn parse_file(file_path: &str) -> Result<ParseResult, PhiParseError> {
    let start_time = Instant::now();

    // Set up file context for global logging
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        log_info!("Starting phi file parsing pipeline", "file" => file_path);

        // Stage 1: File processing
        let file_result = file_processor::process_file(file_path)?;

        // Stages 2-7: In-memory parse
        let spec = parse_source(&file_result.source)?;

        let result = ParseResult::new(spec, file_result.metadata, start_time.elapsed());
        result.log_success(file_path);

        Ok(result)
    })
}

/// Parse phi source text that has already been read into memory
pub fn parse_source(source: &str) -> Result<PhiSpec, PhiParseError> {
    // Stage 2: Line preprocessing
    let lines = preprocess_source(source);

    // Stage 3: Section scanning
    let raw_sections = sections::scan_lines(&lines)?;

    // Stages 4-7: Tokenization, recognition, normalization, decomposition
    assemble(raw_sections)
}

fn assemble(raw: RawSections) -> Result<PhiSpec, PhiParseError> {
    let select_attrs = split_list(&raw.select.unwrap_or_default());
    if select_attrs.is_empty() {
        return Err(SectionError::EmptySection {
            section: "S".to_string(),
        }
        .into());
    }

    let num_grouping_vars = parse_grouping_var_count(&raw.count.unwrap_or_default())?;

    let grouping_attrs = split_list(&raw.grouping.unwrap_or_default());
    if grouping_attrs.is_empty() {
        return Err(SectionError::EmptySection {
            section: "V".to_string(),
        }
        .into());
    }

    let aggregates = match raw.aggregates.as_deref() {
        Some(text) if !text.trim().is_empty() => recognize_aggregates(text)?,
        _ => Vec::new(),
    };

    let predicates = normalize_sigma_lines(&raw.sigma_lines)?;

    let having = match raw.having.as_deref() {
        Some(text) if !text.trim().is_empty() => decompose_having(text)?,
        _ => Vec::new(),
    };

    Ok(PhiSpec {
        select_attrs,
        num_grouping_vars,
        grouping_attrs,
        aggregates,
        predicates,
        having,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::nodes::{AggFunc, ColumnRef};
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
# monthly sales query
S: cust, 1_sum_quant, 2_count_*
n: 2
V: cust
F: 1_sum_quant, 2_count_*
sigma:
1: month == 1
2: month == 2
G: 1_sum_quant > 100 AND month = 1 OR 2_count_* < 5
";

    #[test]
    fn test_full_parse() {
        let spec = parse_source(SAMPLE).unwrap();

        assert_eq!(spec.select_attrs, vec!["cust", "1_sum_quant", "2_count_*"]);
        assert_eq!(spec.num_grouping_vars, 2);
        assert_eq!(spec.grouping_attrs, vec!["cust"]);

        assert_eq!(spec.aggregates.len(), 2);
        assert_eq!(spec.aggregates[0].alias, "1_sum_quant");
        assert_eq!(spec.aggregates[0].function, AggFunc::Sum);
        assert_eq!(spec.aggregates[1].column, ColumnRef::Wildcard);

        assert_eq!(spec.predicates.len(), 2);
        assert_eq!(spec.predicates["1"].source, "month == 1");
        assert_eq!(spec.predicates["2"].source, "month == 2");

        assert_eq!(spec.having.len(), 2);
        assert_eq!(spec.having[0][0].source, "1_sum_quant > 100");
        assert_eq!(spec.having[0][1].source, "month = 1");
        assert_eq!(spec.having[1][0].source, "2_count_* < 5");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_source(SAMPLE).unwrap();
        let second = parse_source(SAMPLE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_optional_sections_absent() {
        let spec = parse_source("S: cust\nn: 1\nV: cust\n").unwrap();
        assert!(spec.aggregates.is_empty());
        assert!(spec.predicates.is_empty());
        assert!(spec.having.is_empty());
    }

    #[test]
    fn test_continuation_tokenization_matches_inline() {
        let inline = parse_source("S: a, b c\nn: 1\nV: g\n").unwrap();
        let continued = parse_source("S: a\nb,c\nn: 1\nV: g\n").unwrap();
        assert_eq!(inline.select_attrs, continued.select_attrs);
        assert_eq!(inline.select_attrs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_section_fails() {
        let error = parse_source("S: cust\nn: 1\n").unwrap_err();
        assert_matches!(error, PhiParseError::Scanning(SectionError::MissingSections { .. }));
    }

    #[test]
    fn test_empty_mandatory_section_fails() {
        let error = parse_source("S:\nn: 1\nV: cust\n").unwrap_err();
        assert_matches!(
            error,
            PhiParseError::Scanning(SectionError::EmptySection { ref section }) if section == "S"
        );
    }

    #[test]
    fn test_malformed_count_fails() {
        let error = parse_source("S: cust\nn: two\nV: cust\n").unwrap_err();
        assert_matches!(error, PhiParseError::Count(_));
    }

    #[test]
    fn test_invalid_aggregate_fails() {
        let error = parse_source("S: cust\nn: 1\nV: cust\nF: 1-sum-quant\n").unwrap_err();
        assert_matches!(error, PhiParseError::Aggregates(_));
    }

    #[test]
    fn test_unlabeled_sigma_merge_end_to_end() {
        let spec =
            parse_source("S: c\nn: 1\nV: c\nsigma:\nqty > 5\nyear == 2020\n").unwrap();
        assert_eq!(spec.predicates["1"].source, "(qty > 5) and (year == 2020)");
    }

    #[test]
    fn test_parse_file_from_disk() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("query.phi");
        fs::write(&file_path, SAMPLE).unwrap();

        let result = parse_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(result.spec.num_grouping_vars, 2);
        assert_eq!(result.metadata.line_count, SAMPLE.lines().count());
    }

    #[test]
    fn test_parse_file_not_found() {
        let error = parse_file("does_not_exist.phi").unwrap_err();
        assert_matches!(error, PhiParseError::FileProcessing(_));
    }
}
