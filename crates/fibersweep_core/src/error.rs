use std::fmt;

/// Failure reported by an optical response collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputeError {
    pub message: String,
}

impl RecomputeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RecomputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RecomputeError {}

/// Why a leaf attribute could not be assigned
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeError {
    /// The attribute does not exist on the node
    Missing,
    /// The attribute exists but cannot hold the given value
    Type { expected: &'static str },
}

/// Errors produced by the sweep engine and its collaborators
#[derive(Debug, Clone)]
pub enum SweepError {
    /// A dotted attribute path could not be resolved on the model
    PathNotFound { path: String, segment: String },
    /// The attribute exists but rejected the assigned value
    TypeMismatch {
        path: String,
        expected: &'static str,
    },
    /// Bad sweep bounds or step count
    InvalidRange {
        start: f64,
        end: f64,
        count: usize,
        reason: &'static str,
    },
    /// Duplicate bindings, mismatched sequence lengths, bad save extension
    Configuration(String),
    /// A requested output attribute cannot be flattened against the model
    UnknownAttribute(String),
    /// Malformed tagged array record or undecodable saved output
    Serialization(String),
    /// The recompute collaborator failed during a step
    Recompute(RecomputeError),
    /// `start()` was called while a run is in progress
    AlreadyRunning,
    /// One or more attributes could not be written back after a run
    RestoreFailed(Vec<SweepError>),
    /// Filesystem failure while saving or loading
    Io(String),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::PathNotFound { path, segment } => {
                write!(f, "attribute path '{path}' not found (unresolved segment '{segment}')")
            }
            SweepError::TypeMismatch { path, expected } => {
                write!(f, "attribute '{path}' expects a value of type {expected}")
            }
            SweepError::InvalidRange {
                start,
                end,
                count,
                reason,
            } => {
                write!(
                    f,
                    "invalid sweep range (start={start}, end={end}, count={count}): {reason}"
                )
            }
            SweepError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            SweepError::UnknownAttribute(name) => {
                write!(f, "optical attribute '{name}' not found in the response")
            }
            SweepError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            SweepError::Recompute(e) => write!(f, "recompute failed: {e}"),
            SweepError::AlreadyRunning => write!(f, "a sweep is already running"),
            SweepError::RestoreFailed(errors) => {
                write!(f, "failed to restore {} attribute(s)", errors.len())?;
                for e in errors {
                    write!(f, "; {e}")?;
                }
                Ok(())
            }
            SweepError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Recompute(e) => Some(e),
            SweepError::RestoreFailed(errors) => errors
                .first()
                .map(|e| e as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<RecomputeError> for SweepError {
    fn from(e: RecomputeError) -> Self {
        SweepError::Recompute(e)
    }
}

impl From<std::io::Error> for SweepError {
    fn from(e: std::io::Error) -> Self {
        SweepError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(e: serde_json::Error) -> Self {
        SweepError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for SweepError {
    fn from(e: bincode::Error) -> Self {
        SweepError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
