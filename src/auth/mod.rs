//! Stateless authentication primitives.
//!
//! Everything here is built on one shared secret and one shared password:
//!
//! - **Session tokens** (`{issued_at_ms}.{hmac}`) prove a successful login for
//!   seven days. Nothing is stored server-side; logout only clears the cookie.
//! - **CSRF tokens** (`{random_hex}.{hmac}`) protect the login form with the
//!   double-submit pattern and live for one hour.
//!
//! Validation never reports *why* a token was rejected. Malformed, expired and
//! forged tokens all produce [`Invalid`].

pub mod compare;
pub mod config;
pub mod cookies;
pub mod csrf;
mod error;
pub mod session;
pub mod signer;

pub use config::AuthConfig;
pub use error::{ConfigError, Invalid, TokenError};

use time::OffsetDateTime;

/// Wall clock in Unix milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}
