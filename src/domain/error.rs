//! Application error taxonomy.
//!
//! Every fallible operation in the usecase layer returns an [`AppError`].
//! The UI layer maps each variant to a stable HTTP status; hub-internal
//! failures (bad frames, failed chat appends) are handled locally and never
//! surface here.

use thiserror::Error;

/// Typed application error.
///
/// Variants carry a human-readable message that is safe to return to
/// clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Bad input or violated domain invariant (room full, already joined, ...)
    #[error("{0}")]
    Validation(String),

    /// Unknown room, participant, or session.
    #[error("{0}")]
    NotFound(String),

    /// Missing, malformed, or expired credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not permitted (e.g. non-creator ending a room).
    #[error("{0}")]
    Forbidden(String),

    /// Duplicate registration.
    #[error("{0}")]
    AlreadyExists(String),

    /// Persistence or downstream-capability failure.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable tag, mirrored into error response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Data-access errors raised by repository implementations.
///
/// Usecases translate these into [`AppError`] at the service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),

    /// Optimistic-concurrency conflict: the stored version no longer matches
    /// the one the caller read. The caller should re-read and retry.
    #[error("version conflict on {0}")]
    Conflict(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("storage failure: {0}")]
    Storage(String),
}
