use thiserror::Error;

/// The only outcome of a failed token check.
///
/// Malformed, expired and forged tokens all collapse into this value so callers
/// cannot tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid token")]
pub struct Invalid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AUTH_SECRET must not be empty")]
    EmptySecret,
    #[error("APP_PASSWORD must not be empty")]
    EmptyPassword,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to read random bytes: {0}")]
    Random(#[from] rand::Error),
}
