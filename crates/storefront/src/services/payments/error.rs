//! Payment service errors.

use thiserror::Error;

use crate::db::RepositoryError;

use super::verifier::SignatureError;

/// Errors from the payment confirmation paths.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A required confirmation field was empty.
    #[error("missing payment data: {0}")]
    MissingData(&'static str),

    /// The supplied signature did not verify. No state was changed.
    #[error("invalid payment signature")]
    InvalidSignature,

    /// No order matches the provider reference for this user (and it is not
    /// an already-completed replay).
    #[error("order not found")]
    OrderNotFound,

    /// The configured signing key was rejected.
    #[error("payment signing key rejected: {0}")]
    Key(String),

    /// The store failed during the transition; surfaced to the caller so the
    /// payment is never silently lost.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<SignatureError> for PaymentError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::MissingData(field) => Self::MissingData(field),
            SignatureError::Mismatch => Self::InvalidSignature,
            SignatureError::Key(reason) => Self::Key(reason),
        }
    }
}
