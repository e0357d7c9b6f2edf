use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrepError>;

/// Failures raised by the preprocessing steps. None of these are recoverable mid-step,
/// they are reported with the step name and offending index so that a misordered
/// invocation can be traced.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("{step}: expected {expected} entries, found {found}")]
    ShapeMismatch {
        step: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("no profile carries the noise measurement flag")]
    MissingNoiseProfile,

    #[error("{step}: {what} index {index} out of range for length {len}")]
    IndexOutOfRange {
        step: &'static str,
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("profile {profile}: flag value {value:#x} does not fit in 31 bits")]
    MalformedFlags { profile: usize, value: u64 },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("collaborator failed: {0}")]
    Collaborator(String),
}
