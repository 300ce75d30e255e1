//! Payment signature verification.
//!
//! Razorpay signs a successful checkout as
//! `HMAC_SHA256(key_secret, "{order_id}|{payment_id}")`, hex-encoded. The
//! comparison against the client-supplied signature is constant-time.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

/// Errors from signature verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// A required input was empty. The field name feeds client error
    /// messaging; it never reveals anything about the expected signature.
    #[error("missing {0}")]
    MissingData(&'static str),

    /// The supplied signature does not match the expected one.
    #[error("signature mismatch")]
    Mismatch,

    /// The signing key was rejected by the MAC implementation.
    #[error("invalid signing key: {0}")]
    Key(String),
}

/// Verifies provider payment signatures against the shared key secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    key_secret: SecretString,
}

impl SignatureVerifier {
    /// Create a verifier from the provider key secret.
    #[must_use]
    pub const fn new(key_secret: SecretString) -> Self {
        Self { key_secret }
    }

    /// Verify a payment signature for an order/payment reference pair.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::MissingData` if any input is empty and
    /// `SignatureError::Mismatch` if the signature does not verify.
    pub fn verify(
        &self,
        provider_order_id: &str,
        provider_payment_id: &str,
        signature: &str,
    ) -> Result<(), SignatureError> {
        if provider_order_id.is_empty() {
            return Err(SignatureError::MissingData("provider order reference"));
        }
        if provider_payment_id.is_empty() {
            return Err(SignatureError::MissingData("provider payment reference"));
        }
        if signature.is_empty() {
            return Err(SignatureError::MissingData("signature"));
        }

        let payload = format!("{provider_order_id}|{provider_payment_id}");

        let mut mac = Hmac::<Sha256>::new_from_slice(self.key_secret.expose_secret().as_bytes())
            .map_err(|e| SignatureError::Key(e.to_string()))?;
        mac.update(payload.as_bytes());

        let expected = hex::encode(mac.finalize().into_bytes());

        if !constant_time_compare(&expected, signature) {
            return Err(SignatureError::Mismatch);
        }

        Ok(())
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::from("test-key-secret"))
    }

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(b"test-key-secret").expect("valid key length");
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "helloo"));
    }

    #[test]
    fn test_verify_valid_signature() {
        let signature = sign("pay_order_1", "pay_123");
        assert_eq!(
            verifier().verify("pay_order_1", "pay_123", &signature),
            Ok(())
        );
    }

    #[test]
    fn test_verify_tampered_signature() {
        let mut signature = sign("pay_order_1", "pay_123");
        // Flip the last character.
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });

        assert_eq!(
            verifier().verify("pay_order_1", "pay_123", &signature),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_verify_signature_for_different_order() {
        let signature = sign("pay_order_2", "pay_123");
        assert_eq!(
            verifier().verify("pay_order_1", "pay_123", &signature),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_verify_missing_inputs() {
        let v = verifier();
        assert_eq!(
            v.verify("", "pay_123", "sig"),
            Err(SignatureError::MissingData("provider order reference"))
        );
        assert_eq!(
            v.verify("pay_order_1", "", "sig"),
            Err(SignatureError::MissingData("provider payment reference"))
        );
        assert_eq!(
            v.verify("pay_order_1", "pay_123", ""),
            Err(SignatureError::MissingData("signature"))
        );
    }

    #[test]
    fn test_verify_wrong_secret() {
        let signature = sign("pay_order_1", "pay_123");
        let other = SignatureVerifier::new(SecretString::from("other-key-secret"));
        assert_eq!(
            other.verify("pay_order_1", "pay_123", &signature),
            Err(SignatureError::Mismatch)
        );
    }
}
