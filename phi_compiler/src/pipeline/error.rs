use crate::file_processor::FileProcessorError;
use crate::having::HavingError;
use crate::phi::aggregate::AggregateError;
use crate::phi::count::CountError;
use crate::predicate::PredicateError;
use crate::sections::SectionError;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PhiParseError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Section scanning failed: {0}")]
    Scanning(#[from] SectionError),

    #[error("Grouping variable count invalid: {0}")]
    Count(#[from] CountError),

    #[error("Aggregate recognition failed: {0}")]
    Aggregates(#[from] AggregateError),

    #[error("Predicate normalization failed: {0}")]
    Predicates(#[from] PredicateError),

    #[error("Having decomposition failed: {0}")]
    Having(#[from] HavingError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PhiParseError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }
}
