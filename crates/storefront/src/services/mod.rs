//! Business-logic services composed from repositories and collaborators.

pub mod notifications;
pub mod payments;

pub use notifications::NotificationClient;
pub use payments::{
    ConfirmPaymentRequest, ConfirmationOutcome, PaymentError, PaymentService, SignatureVerifier,
};
