//! Double-submit CSRF tokens: `"{random_hex}.{signature}"`.
//!
//! The same value travels in the `csrf-token` cookie and the `X-CSRF-Token`
//! header. The signature ties the cookie to the server secret, so a cookie
//! planted by a sibling origin cannot be paired with a matching header.

use rand::{rngs::OsRng, RngCore};

use super::{
    error::{Invalid, TokenError},
    signer::Signer,
};

/// Raw random bytes per token before hex encoding.
pub const CSRF_TOKEN_BYTES: usize = 32;

/// What [`CsrfCodec::current_or_new`] handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrfIssue {
    /// The cookie already carried a value; it is returned untouched.
    Existing(String),
    /// A new token that still has to be written to the cookie.
    Fresh(String),
}

impl CsrfIssue {
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Existing(token) | Self::Fresh(token) => token,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CsrfCodec {
    signer: Signer,
}

impl CsrfCodec {
    #[must_use]
    pub fn new(signer: Signer) -> Self {
        Self { signer }
    }

    /// Draw fresh randomness and sign it.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub fn issue(&self) -> Result<String, TokenError> {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(self.issue_from(&bytes))
    }

    /// Sign caller-supplied randomness.
    #[must_use]
    pub fn issue_from(&self, random: &[u8; CSRF_TOKEN_BYTES]) -> String {
        let random_hex = hex::encode(random);
        let signature = self.signer.sign(&random_hex);
        format!("{random_hex}.{signature}")
    }

    /// Reuse the cookie value when present and non-empty, otherwise issue.
    ///
    /// The existing value is not re-verified here; that happens on submission.
    ///
    /// # Errors
    /// Returns an error if a new token is needed and the random source fails.
    pub fn current_or_new(&self, cookie: Option<&str>) -> Result<CsrfIssue, TokenError> {
        match cookie.filter(|value| !value.is_empty()) {
            Some(existing) => Ok(CsrfIssue::Existing(existing.to_string())),
            None => self.issue().map(CsrfIssue::Fresh),
        }
    }

    /// Check a login submission.
    ///
    /// Header and cookie must both be present and identical; the cookie's
    /// embedded signature must then verify. The equality check is plain string
    /// comparison because both values are already visible to the client.
    ///
    /// # Errors
    /// Returns [`Invalid`] on any failure.
    pub fn validate_submission(
        &self,
        header: Option<&str>,
        cookie: Option<&str>,
    ) -> Result<(), Invalid> {
        let (Some(header), Some(cookie)) = (header, cookie) else {
            return Err(Invalid);
        };
        if header.is_empty() || header != cookie {
            return Err(Invalid);
        }
        self.verify_signed(cookie)
    }

    /// # Errors
    /// Returns [`Invalid`] if the value is malformed or its signature does not match.
    pub fn verify_signed(&self, token: &str) -> Result<(), Invalid> {
        let (random_hex, signature) = token.split_once('.').ok_or(Invalid)?;
        if random_hex.is_empty() || signature.is_empty() || signature.contains('.') {
            return Err(Invalid);
        }
        if self.signer.verify(random_hex, signature) {
            Ok(())
        } else {
            Err(Invalid)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn codec(secret: &str) -> CsrfCodec {
        CsrfCodec::new(Signer::new(&SecretString::from(secret.to_string())).unwrap())
    }

    #[test]
    fn issued_token_shape() {
        let token = codec("secret").issue().unwrap();
        let (random_hex, signature) = token.split_once('.').unwrap();
        assert_eq!(random_hex.len(), CSRF_TOKEN_BYTES * 2);
        assert_eq!(signature.len(), 64);
        assert!(token.chars().all(|c| c == '.' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn issued_tokens_differ() {
        let codec = codec("secret");
        assert_ne!(codec.issue().unwrap(), codec.issue().unwrap());
    }

    #[test]
    fn matching_pair_validates() {
        let codec = codec("secret");
        let token = codec.issue().unwrap();
        assert_eq!(codec.validate_submission(Some(&token), Some(&token)), Ok(()));
    }

    #[test]
    fn missing_side_fails() {
        let codec = codec("secret");
        let token = codec.issue().unwrap();
        assert_eq!(codec.validate_submission(Some(&token), None), Err(Invalid));
        assert_eq!(codec.validate_submission(None, Some(&token)), Err(Invalid));
        assert_eq!(codec.validate_submission(None, None), Err(Invalid));
        assert_eq!(codec.validate_submission(Some(""), Some("")), Err(Invalid));
    }

    #[test]
    fn unequal_pair_fails() {
        let codec = codec("secret");
        let first = codec.issue().unwrap();
        let second = codec.issue().unwrap();
        assert_eq!(
            codec.validate_submission(Some(&first), Some(&second)),
            Err(Invalid)
        );
    }

    #[test]
    fn forged_signature_fails_even_when_pair_matches() {
        let codec = codec("secret");
        let forged = self::codec("attacker").issue_from(&[7u8; CSRF_TOKEN_BYTES]);
        assert_eq!(
            codec.validate_submission(Some(&forged), Some(&forged)),
            Err(Invalid)
        );

        let genuine = codec.issue_from(&[7u8; CSRF_TOKEN_BYTES]);
        let mut tampered = genuine.into_bytes();
        tampered[0] = if tampered[0] == b'0' { b'1' } else { b'0' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert_eq!(
            codec.validate_submission(Some(&tampered), Some(&tampered)),
            Err(Invalid)
        );
    }

    #[test]
    fn malformed_values_fail() {
        let codec = codec("secret");
        for value in ["", ".", "abc", "abc.", ".abc", "a.b.c", "abc.not-hex"] {
            assert_eq!(codec.verify_signed(value), Err(Invalid), "accepted {value:?}");
        }
    }

    #[test]
    fn current_or_new_reuses_cookie() {
        let codec = codec("secret");
        // Not re-verified on fetch.
        let issue = codec.current_or_new(Some("stale.value")).unwrap();
        assert_eq!(issue, CsrfIssue::Existing("stale.value".to_string()));
        assert_eq!(issue.token(), "stale.value");
    }

    #[test]
    fn current_or_new_issues_when_missing_or_empty() {
        let codec = codec("secret");
        for cookie in [None, Some("")] {
            let issue = codec.current_or_new(cookie).unwrap();
            assert!(matches!(issue, CsrfIssue::Fresh(_)));
            assert!(codec.verify_signed(issue.token()).is_ok());
        }
    }
}
