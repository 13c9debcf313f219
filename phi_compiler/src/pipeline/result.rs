use crate::file_processor::FileMetadata;
use crate::log_success;
use crate::logging::codes;
use crate::phi::nodes::PhiSpec;
use std::time::Duration;

/// Complete pipeline result for one parsed file
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The validated parse result
    pub spec: PhiSpec,
    /// Metadata of the processed input file
    pub metadata: FileMetadata,
    /// Total pipeline duration
    pub total_duration: Duration,
}

impl ParseResult {
    pub fn new(spec: PhiSpec, metadata: FileMetadata, total_duration: Duration) -> Self {
        Self {
            spec,
            metadata,
            total_duration,
        }
    }

    /// Log a success summary for this parse
    pub fn log_success(&self, file_path: &str) {
        let duration_ms = self.total_duration.as_secs_f64() * 1000.0;
        log_success!(codes::success::SPEC_ASSEMBLY_COMPLETE,
            "Phi file parsing completed successfully",
            "file" => file_path,
            "select_attrs" => self.spec.select_attrs.len(),
            "grouping_vars" => self.spec.num_grouping_vars,
            "grouping_attrs" => self.spec.grouping_attrs.len(),
            "aggregates" => self.spec.aggregates.len(),
            "predicates" => self.spec.predicates.len(),
            "having_or_blocks" => self.spec.having.len(),
            "duration_ms" => format!("{:.2}", duration_ms));
    }
}
