//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Boundary-level domain error.
///
/// Keep this focused on deterministic parse failures at the edge of the
/// domain (codes and identifiers arriving as text). Operation errors live
/// with the service that produces them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A blood type code was not one of the eight recognized codes.
    #[error("invalid blood type code: {0}")]
    InvalidBloodType(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_blood_type(code: impl Into<String>) -> Self {
        Self::InvalidBloodType(code.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
