//! The error type raised by the simulation and planning core.
//!
//! Library functions return [`anyhow::Result`]. Failures in the core are raised as
//! [`PlanningError`]s so that callers can recover the classification with
//! [`anyhow::Error::downcast_ref`].
use std::error::Error;
use std::fmt;

/// The kind of failure which occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing required input
    Validation,
    /// A product is unknown, or the predictor/dataset has not been prepared
    NotFound,
    /// A numeric field could not be parsed or the prediction failed
    Computation,
}

impl ErrorKind {
    /// Whether this kind of error was caused by the caller's input
    pub fn is_client_error(self) -> bool {
        match self {
            Self::Validation | Self::NotFound => true,
            Self::Computation => false,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation error",
            Self::NotFound => "not found",
            Self::Computation => "computation error",
        };
        write!(f, "{label}")
    }
}

/// Indicates that a simulation, planning or comparison request could not be completed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningError {
    kind: ErrorKind,
    message: String,
}

impl PlanningError {
    /// Create a new [`PlanningError`]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a [`ErrorKind::Validation`] error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Shorthand for a [`ErrorKind::NotFound`] error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Shorthand for a [`ErrorKind::Computation`] error
    pub fn computation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Computation, message)
    }

    /// The kind of error
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// This is needed so that PlanningError can be treated like standard errors are.
impl Error for PlanningError {}

/// Get the [`ErrorKind`] of an [`anyhow::Error`], if it was caused by a [`PlanningError`]
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PlanningError>())
        .map(PlanningError::kind)
}
