//! Error types for authorization evaluations
//!
//! This module defines the errors an evaluation can produce: the default
//! denial, an unregistered role reached during evaluation, and a role check
//! attempted without a user.

use thiserror::Error;

/// Authorization error types.
///
/// `NotAuthorized` is what the built-in denied callback returns; the other
/// variants indicate evaluation-setup problems rather than a denial.
#[derive(Debug, Error)]
pub enum AccessError {
    /// A required role check failed and the default denied callback ran.
    ///
    /// The message is deliberately generic: the failing role name is handed
    /// to the denied callback as a reason string, not embedded here. Supply
    /// a custom denied callback to surface it.
    #[error("Not authorized")]
    NotAuthorized,

    /// A required role was never registered.
    ///
    /// `only` records the role name without validating it; the gap surfaces
    /// here when the evaluation reaches the empty slot.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A role check was required but no user was configured or supplied.
    #[error("No user available for evaluation")]
    MissingUser,
}

/// Result type for authorization evaluations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Check if this error is an authorization denial.
    ///
    /// Denials are the expected outcome of a failed role check; the other
    /// variants point at registry or evaluation misconfiguration.
    pub fn is_denial(&self) -> bool {
        matches!(self, AccessError::NotAuthorized)
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::NotAuthorized => 403,
            AccessError::UnknownRole(_) => 500,
            AccessError::MissingUser => 401,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::NotAuthorized => "NOT_AUTHORIZED",
            AccessError::UnknownRole(_) => "UNKNOWN_ROLE",
            AccessError::MissingUser => "MISSING_USER",
        }
    }
}
