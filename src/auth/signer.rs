//! HMAC-SHA256 signing over string messages.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::{compare::timing_safe_str_eq, error::ConfigError};

type HmacSha256 = Hmac<Sha256>;

/// Keyed signer for one token kind.
///
/// The key schedule is computed once; every signature starts from a clone of it.
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl Signer {
    /// Build a signer from the raw secret bytes.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptySecret`] when the secret is empty.
    pub fn new(secret: &SecretString) -> Result<Self, ConfigError> {
        let key = secret.expose_secret().as_bytes();
        if key.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(key).map_err(|_| ConfigError::EmptySecret)?;
        Ok(Self { mac })
    }

    /// Lowercase hex HMAC of `message`, 64 characters.
    #[must_use]
    pub fn sign(&self, message: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Recompute the signature of `message` and compare it with `signature_hex`.
    ///
    /// Malformed or uppercase hex never matches; no error is raised.
    #[must_use]
    pub fn verify(&self, message: &str, signature_hex: &str) -> bool {
        let expected = self.sign(message);
        timing_safe_str_eq(&expected, signature_hex)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").field("key", &"***").finish()
    }
}
