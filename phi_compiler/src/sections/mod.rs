//! Section scanning module
//!
//! Walks preprocessed lines and assigns each to one of the six recognized
//! sections (`S:`, `n:`, `V:`, `F:`, `sigma:`, `G:`) using case-insensitive
//! prefix matching, accumulating continuation lines into the active section.

pub mod error;
pub mod scanner;

pub use error::SectionError;
pub use scanner::{RawSections, SectionKind, SectionScanner};

use crate::config::runtime::ScannerPreferences;
use crate::utils::Spanned;

/// Scan preprocessed lines into raw section texts with default preferences
pub fn scan_lines(lines: &[Spanned<String>]) -> Result<RawSections, SectionError> {
    SectionScanner::new().scan(lines)
}

/// Scan with custom runtime preferences
pub fn scan_lines_with_preferences(
    lines: &[Spanned<String>],
    preferences: ScannerPreferences,
) -> Result<RawSections, SectionError> {
    SectionScanner::with_preferences(preferences).scan(lines)
}
