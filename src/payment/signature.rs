//! Payment callback signatures: hex HMAC-SHA256 over `order_id|payment_id`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

use super::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Validates gateway callbacks signed with the shared key secret.
///
/// The signature is `hex(HMAC-SHA256(secret, "{order_id}|{payment_id}"))`.
pub struct PaymentIntegrityChecker {
    secret: SecretString,
}

impl PaymentIntegrityChecker {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Lower-case hex signature for an order/payment pair.
    ///
    /// # Errors
    /// Returns `PaymentError::Key` if the secret cannot key the MAC.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> Result<String, PaymentError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|err| PaymentError::Key(err.to_string()))?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify a payment confirmation callback.
    ///
    /// Absent and empty values are both treated as missing. The comparison is
    /// constant time over the hex strings, so case differences are mismatches.
    ///
    /// # Errors
    /// `MissingFields` if any input is absent, `SignatureMismatch` otherwise on
    /// any difference.
    pub fn verify_callback(
        &self,
        order_id: Option<&str>,
        payment_id: Option<&str>,
        signature: Option<&str>,
    ) -> Result<(), PaymentError> {
        let present: fn(Option<&str>) -> Option<&str> = |value| value.filter(|value| !value.is_empty());
        let (Some(order_id), Some(payment_id), Some(signature)) =
            (present(order_id), present(payment_id), present(signature))
        else {
            return Err(PaymentError::MissingFields);
        };

        let expected = self.sign(order_id, payment_id)?;
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(())
        } else {
            warn!(order_id, "payment signature mismatch");
            Err(PaymentError::SignatureMismatch)
        }
    }
}

impl std::fmt::Debug for PaymentIntegrityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentIntegrityChecker")
            .field("secret", &"***")
            .finish()
    }
}
