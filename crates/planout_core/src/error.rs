use thiserror::Error;

/// Failures raised while interpreting loosely-typed task records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown task status `{0}`")]
    UnknownStatus(String),

    #[error("unknown frequency `{0}`")]
    UnknownFrequency(String),

    #[error("invalid calendar date `{0}`")]
    InvalidDate(String),
}
