//! Stateless session tokens: `"{issued_at_ms}.{signature}"`.
//!
//! The signature is the HMAC of the decimal timestamp. A token is valid for
//! [`SESSION_TTL_MS`] after issue; there is no server-side record and no revocation.

use std::fmt;

use super::{error::Invalid, now_ms, signer::Signer};

/// 7 days.
pub const SESSION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    issued_at_ms: i64,
    timestamp: String,
    signature: String,
}

impl SessionToken {
    /// Split a raw cookie value into its timestamp and signature.
    ///
    /// # Errors
    /// Returns [`Invalid`] unless the value is exactly two non-empty parts
    /// separated by one `.` with an integer first part.
    pub fn parse(raw: &str) -> Result<Self, Invalid> {
        let (timestamp, signature) = raw.split_once('.').ok_or(Invalid)?;
        if timestamp.is_empty() || signature.is_empty() || signature.contains('.') {
            return Err(Invalid);
        }
        let issued_at_ms = timestamp.parse::<i64>().map_err(|_| Invalid)?;
        Ok(Self {
            issued_at_ms,
            timestamp: timestamp.to_string(),
            signature: signature.to_string(),
        })
    }

    #[must_use]
    pub const fn issued_at_ms(&self) -> i64 {
        self.issued_at_ms
    }

    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.timestamp, self.signature)
    }
}

#[derive(Clone, Debug)]
pub struct SessionCodec {
    signer: Signer,
}

impl SessionCodec {
    #[must_use]
    pub fn new(signer: Signer) -> Self {
        Self { signer }
    }

    /// Mint a token stamped with the current time.
    #[must_use]
    pub fn issue(&self) -> String {
        self.issue_at(now_ms())
    }

    #[must_use]
    pub fn issue_at(&self, now_ms: i64) -> String {
        let timestamp = now_ms.to_string();
        let signature = self.signer.sign(&timestamp);
        format!("{timestamp}.{signature}")
    }

    /// # Errors
    /// Returns [`Invalid`] for malformed, expired or forged tokens.
    pub fn verify(&self, raw: &str) -> Result<SessionToken, Invalid> {
        self.verify_at(raw, now_ms())
    }

    /// # Errors
    /// Returns [`Invalid`] for malformed, expired or forged tokens.
    pub fn verify_at(&self, raw: &str, now_ms: i64) -> Result<SessionToken, Invalid> {
        let token = SessionToken::parse(raw)?;
        if now_ms.saturating_sub(token.issued_at_ms) > SESSION_TTL_MS {
            return Err(Invalid);
        }
        if !self.signer.verify(&token.timestamp, &token.signature) {
            return Err(Invalid);
        }
        Ok(token)
    }

    #[must_use]
    pub fn is_valid(&self, raw: &str) -> bool {
        self.verify(raw).is_ok()
    }
}
