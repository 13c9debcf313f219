//! Table-driven section scanner
//!
//! Implements section recognition as an explicit state machine: one state per
//! section plus "none", a single accumulator record, and transitions driven by
//! a fixed header table. Continuation lines merge into the active section's
//! accumulator; lines seen before any header are dropped.

use crate::config::compile_time::scanning::{MAX_SECTION_TEXT_LENGTH, MAX_SIGMA_LINES};
use crate::config::runtime::ScannerPreferences;
use crate::logging::codes;
use crate::sections::error::SectionError;
use crate::utils::Spanned;
use crate::{log_debug, log_error, log_success, log_warning};

/// The six recognized sections of a phi input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// `S:` — select attribute list (mandatory)
    Select,
    /// `n:` — grouping variable count (mandatory)
    Count,
    /// `V:` — grouping attribute list (mandatory)
    Grouping,
    /// `F:` — aggregate token list (optional)
    Aggregates,
    /// `sigma:` — per-grouping-variable predicates (optional)
    Sigma,
    /// `G:` — HAVING clause (optional)
    Having,
}

impl SectionKind {
    /// Header prefixes in fixed test order
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Select,
        SectionKind::Count,
        SectionKind::Grouping,
        SectionKind::Aggregates,
        SectionKind::Sigma,
        SectionKind::Having,
    ];

    /// The header prefix that introduces this section (matched case-insensitively)
    pub fn header(&self) -> &'static str {
        match self {
            SectionKind::Select => "s:",
            SectionKind::Count => "n:",
            SectionKind::Grouping => "v:",
            SectionKind::Aggregates => "f:",
            SectionKind::Sigma => "sigma:",
            SectionKind::Having => "g:",
        }
    }

    /// The section label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Select => "S",
            SectionKind::Count => "n",
            SectionKind::Grouping => "V",
            SectionKind::Aggregates => "F",
            SectionKind::Sigma => "sigma",
            SectionKind::Having => "G",
        }
    }

    /// Whether the section must be present for a valid parse
    pub fn is_mandatory(&self) -> bool {
        matches!(
            self,
            SectionKind::Select | SectionKind::Count | SectionKind::Grouping
        )
    }
}

/// Match a line against the header table, returning the section and the
/// trimmed remainder after the header colon.
fn match_header(line: &str) -> Option<(SectionKind, &str)> {
    for kind in SectionKind::ALL {
        let header = kind.header();
        if let Some(prefix) = line.get(..header.len()) {
            if prefix.eq_ignore_ascii_case(header) {
                return Some((kind, line[header.len()..].trim()));
            }
        }
    }
    None
}

/// Accumulated raw section texts after scanning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSections {
    /// `S:` value (None if the header never appeared)
    pub select: Option<String>,
    /// `n:` value
    pub count: Option<String>,
    /// `V:` value
    pub grouping: Option<String>,
    /// `F:` value
    pub aggregates: Option<String>,
    /// `sigma:` lines, one logical predicate line each
    pub sigma_lines: Vec<String>,
    /// `G:` value
    pub having: Option<String>,
}

impl RawSections {
    fn slot_mut(&mut self, kind: SectionKind) -> &mut Option<String> {
        match kind {
            SectionKind::Select => &mut self.select,
            SectionKind::Count => &mut self.count,
            SectionKind::Grouping => &mut self.grouping,
            SectionKind::Aggregates => &mut self.aggregates,
            SectionKind::Having => &mut self.having,
            SectionKind::Sigma => unreachable!("sigma accumulates as lines"),
        }
    }

    /// Sections still unset after scanning, restricted to the mandatory ones
    fn missing_mandatory(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.select.is_none() {
            missing.push("S".to_string());
        }
        if self.count.is_none() {
            missing.push("n".to_string());
        }
        if self.grouping.is_none() {
            missing.push("V".to_string());
        }
        missing
    }
}

/// Section scanner: cursor over the active section plus the accumulator record
pub struct SectionScanner {
    sections: RawSections,
    mode: Option<SectionKind>,
    preferences: ScannerPreferences,
}

impl SectionScanner {
    pub fn new() -> Self {
        Self {
            sections: RawSections::default(),
            mode: None,
            preferences: ScannerPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: ScannerPreferences) -> Self {
        Self {
            sections: RawSections::default(),
            mode: None,
            preferences,
        }
    }

    /// Scan all preprocessed lines and validate mandatory sections
    pub fn scan(mut self, lines: &[Spanned<String>]) -> Result<RawSections, SectionError> {
        for line in lines {
            self.scan_line(line)?;
        }
        self.finish()
    }

    fn scan_line(&mut self, line: &Spanned<String>) -> Result<(), SectionError> {
        if let Some((kind, rest)) = match_header(&line.value) {
            if self.preferences.log_section_switches {
                log_debug!("Switched section",
                    "section" => kind.label(),
                    "line" => line.span.start().line);
            }
            self.mode = Some(kind);
            if kind == SectionKind::Sigma {
                // A non-empty remainder is the first sigma line
                if !rest.is_empty() {
                    self.push_sigma(rest.to_string())?;
                }
            } else {
                // A repeated header re-enters the section and replaces its text
                *self.sections.slot_mut(kind) = Some(rest.to_string());
                self.check_length(kind)?;
            }
            return Ok(());
        }

        match self.mode {
            None => {
                // No accumulator target yet; the line is silently dropped
                if self.preferences.log_orphan_continuations {
                    log_warning!("Continuation line before any section header dropped",
                        "line" => line.span.start().line,
                        "text" => line.value);
                }
            }
            Some(SectionKind::Sigma) => self.push_sigma(line.value.clone())?,
            Some(kind) => {
                let slot = self.sections.slot_mut(kind);
                if let Some(text) = slot.as_mut() {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&line.value);
                }
                self.check_length(kind)?;
            }
        }

        Ok(())
    }

    fn push_sigma(&mut self, line: String) -> Result<(), SectionError> {
        if self.sections.sigma_lines.len() >= MAX_SIGMA_LINES {
            let error = SectionError::TooManySigmaLines {
                count: self.sections.sigma_lines.len() + 1,
                max: MAX_SIGMA_LINES,
            };
            log_error!(error.error_code(), "Too many sigma lines",
                "max" => MAX_SIGMA_LINES);
            return Err(error);
        }
        self.sections.sigma_lines.push(line);
        Ok(())
    }

    fn check_length(&mut self, kind: SectionKind) -> Result<(), SectionError> {
        let length = match kind {
            SectionKind::Sigma => return Ok(()),
            _ => self
                .sections
                .slot_mut(kind)
                .as_ref()
                .map(|t| t.len())
                .unwrap_or(0),
        };

        if length > MAX_SECTION_TEXT_LENGTH {
            let error = SectionError::SectionTooLarge {
                section: kind.label().to_string(),
                length,
                max: MAX_SECTION_TEXT_LENGTH,
            };
            log_error!(error.error_code(), "Section text exceeds maximum length",
                "section" => kind.label(),
                "length" => length,
                "max" => MAX_SECTION_TEXT_LENGTH);
            return Err(error);
        }

        Ok(())
    }

    fn finish(self) -> Result<RawSections, SectionError> {
        let missing = self.sections.missing_mandatory();
        if !missing.is_empty() {
            let error = SectionError::MissingSections {
                sections: missing.clone(),
            };
            log_error!(error.error_code(), "Mandatory section(s) missing",
                "sections" => missing.join(", "));
            return Err(error);
        }

        log_success!(codes::success::SECTION_SCAN_COMPLETE,
            "Section scan completed",
            "has_aggregates" => self.sections.aggregates.is_some(),
            "sigma_lines" => self.sections.sigma_lines.len(),
            "has_having" => self.sections.having.is_some());

        Ok(self.sections)
    }
}

impl Default for SectionScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess_source;

    fn scan(source: &str) -> Result<RawSections, SectionError> {
        SectionScanner::new().scan(&preprocess_source(source))
    }

    #[test]
    fn test_basic_sections() {
        let sections = scan("S: cust, prod\nn: 2\nV: cust\nF: 1_sum_quant\n").unwrap();
        assert_eq!(sections.select.as_deref(), Some("cust, prod"));
        assert_eq!(sections.count.as_deref(), Some("2"));
        assert_eq!(sections.grouping.as_deref(), Some("cust"));
        assert_eq!(sections.aggregates.as_deref(), Some("1_sum_quant"));
        assert!(sections.having.is_none());
        assert!(sections.sigma_lines.is_empty());
    }

    #[test]
    fn test_case_insensitive_headers() {
        let sections = scan("s: cust\nN: 1\nv: cust\nSIGMA:\nqty > 10\n").unwrap();
        assert_eq!(sections.select.as_deref(), Some("cust"));
        assert_eq!(sections.count.as_deref(), Some("1"));
        assert_eq!(sections.sigma_lines, vec!["qty > 10"]);
    }

    #[test]
    fn test_continuation_lines_space_joined() {
        let sections = scan("S: cust\nprod day\nn: 1\nV: cust\n").unwrap();
        assert_eq!(sections.select.as_deref(), Some("cust prod day"));
    }

    #[test]
    fn test_sigma_continuations_kept_as_lines() {
        let sections = scan("S: c\nn: 2\nV: c\nsigma: 1: qty > 10\n2: year == 2020\n").unwrap();
        assert_eq!(
            sections.sigma_lines,
            vec!["1: qty > 10", "2: year == 2020"]
        );
    }

    #[test]
    fn test_orphan_continuation_dropped() {
        let sections = scan("stray line without header\nS: c\nn: 1\nV: c\n").unwrap();
        assert_eq!(sections.select.as_deref(), Some("c"));
    }

    #[test]
    fn test_missing_mandatory_sections() {
        let error = scan("S: c\nn: 1\n").unwrap_err();
        match error {
            SectionError::MissingSections { sections } => {
                assert_eq!(sections, vec!["V".to_string()]);
            }
            other => panic!("Expected MissingSections, got {:?}", other),
        }
    }

    #[test]
    fn test_all_missing_reported_together() {
        let error = scan("G: x > 1\n").unwrap_err();
        match error {
            SectionError::MissingSections { sections } => {
                assert_eq!(
                    sections,
                    vec!["S".to_string(), "n".to_string(), "V".to_string()]
                );
            }
            other => panic!("Expected MissingSections, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_header_replaces_text() {
        let sections = scan("S: old\nn: 1\nV: c\nS: new\n").unwrap();
        assert_eq!(sections.select.as_deref(), Some("new"));
    }

    #[test]
    fn test_empty_file_reports_all_mandatory() {
        let error = scan("").unwrap_err();
        assert!(matches!(error, SectionError::MissingSections { .. }));
    }
}
