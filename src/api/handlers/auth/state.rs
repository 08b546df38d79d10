//! Shared auth state handed to handlers and the request gate.

use std::sync::Arc;

use crate::{
    auth::{
        cookies::CookieJar, csrf::CsrfCodec, session::SessionCodec, signer::Signer, AuthConfig,
        ConfigError,
    },
    rate_limit::RateLimiter,
};

/// Everything the auth endpoints need, built once at startup and read-only afterwards.
pub struct AuthState {
    config: AuthConfig,
    sessions: SessionCodec,
    csrf: CsrfCodec,
    cookies: CookieJar,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the configured secret cannot key the signers.
    pub fn new(config: AuthConfig, rate_limiter: Arc<dyn RateLimiter>) -> Result<Self, ConfigError> {
        // Both token kinds share the secret; separate signers keep the uses apart.
        let sessions = SessionCodec::new(Signer::new(config.secret())?);
        let csrf = CsrfCodec::new(Signer::new(config.secret())?);
        let cookies = CookieJar::new(config.secure_cookies());
        Ok(Self {
            config,
            sessions,
            csrf,
            cookies,
            rate_limiter,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionCodec {
        &self.sessions
    }

    #[must_use]
    pub const fn csrf(&self) -> &CsrfCodec {
        &self.csrf
    }

    #[must_use]
    pub const fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}
