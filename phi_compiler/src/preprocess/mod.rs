//! Line preprocessor
//!
//! First pipeline stage: strips `#` comments, trims surrounding whitespace,
//! and drops empty lines, keeping the original source location of every
//! surviving line. This stage has no error conditions; an entirely
//! empty or commented file yields an empty sequence and downstream
//! validation reports the resulting missing sections.

use crate::log_debug;
use crate::utils::{Span, Spanned};

/// Preprocess raw source text into comment-free, non-empty logical lines.
///
/// Each physical line is truncated at the first `#` (no escaping support),
/// trimmed, and discarded if nothing remains.
pub fn preprocess_source(source: &str) -> Vec<Spanned<String>> {
    let mut lines = Vec::new();
    let mut offset = 0usize;
    let mut total = 0usize;

    for (idx, segment) in source.split_inclusive('\n').enumerate() {
        total += 1;
        let line_no = (idx + 1) as u32;
        let raw = segment.trim_end_matches(['\n', '\r']);

        let without_comment = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };

        let trimmed = without_comment.trim();
        if !trimmed.is_empty() {
            let leading = without_comment.len() - without_comment.trim_start().len();
            let span = Span::line(
                offset + leading,
                line_no,
                (leading + 1) as u32,
                trimmed.len(),
            );
            lines.push(Spanned::new(trimmed.to_string(), span));
        }

        offset += segment.len();
    }

    log_debug!("Preprocessing complete",
        "physical_lines" => total,
        "kept_lines" => lines.len(),
        "dropped_lines" => total - lines.len());

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Spanned<String>]) -> Vec<&str> {
        lines.iter().map(|l| l.value.as_str()).collect()
    }

    #[test]
    fn test_strips_comments_and_blanks() {
        let source = "S: cust  # select list\n\n# full comment line\nn: 1\n";
        let lines = preprocess_source(source);
        assert_eq!(texts(&lines), vec!["S: cust", "n: 1"]);
    }

    #[test]
    fn test_comment_mid_line_truncates() {
        let lines = preprocess_source("V: cust prod # grouping attrs");
        assert_eq!(texts(&lines), vec!["V: cust prod"]);
    }

    #[test]
    fn test_empty_input_yields_empty_sequence() {
        assert!(preprocess_source("").is_empty());
        assert!(preprocess_source("# only comments\n#\n   \n").is_empty());
    }

    #[test]
    fn test_line_numbers_preserved() {
        let source = "# header\nS: cust\n\nV: prod\n";
        let lines = preprocess_source(source);
        assert_eq!(lines[0].span.start().line, 2);
        assert_eq!(lines[1].span.start().line, 4);
    }

    #[test]
    fn test_leading_whitespace_trimmed_with_column() {
        let lines = preprocess_source("   n: 2");
        assert_eq!(lines[0].value, "n: 2");
        assert_eq!(lines[0].span.start().column, 4);
    }

    #[test]
    fn test_crlf_handling() {
        let lines = preprocess_source("S: cust\r\nn: 1\r\n");
        assert_eq!(texts(&lines), vec!["S: cust", "n: 1"]);
    }
}
