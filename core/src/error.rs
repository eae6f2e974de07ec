use thiserror::Error;

/// Boxed failure raised by a single pipeline step.
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while resolving a document's id and text properties.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("document schema does not designate an id field")]
    NoIdAccessor,
    #[error("document schema designates more than one id field")]
    DuplicateIdAccessor,
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("document has no id field `{field}`")]
    MissingId { field: String },
    #[error("id field `{field}` is null")]
    NullId { field: String },
    #[error("id field `{field}` is not a valid document id: {value}")]
    InvalidId { field: String, value: String },
}

/// A pipeline step failed; later steps were not run.
#[derive(Debug, Error)]
#[error("text processing pipeline failed at step {step_index}")]
pub struct PipelineStepError {
    /// Zero-based position of the failing step.
    pub step_index: usize,
    #[source]
    pub cause: StepError,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Pipeline(#[from] PipelineStepError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
