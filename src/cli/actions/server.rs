use crate::{
    api::{self, handlers::auth::AuthState},
    auth::AuthConfig,
    rate_limit::{NoopRateLimiter, RateLimiter, SlidingWindowRateLimiter},
    storage::{
        s3::{S3Config, S3Store},
        sigv4::Credentials,
        MediaStore,
    },
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub secure_cookies: bool,
    pub static_dir: Option<PathBuf>,
    pub auth_secret: SecretString,
    pub app_password: SecretString,
    pub rate_limit_max_attempts: u32,
    pub rate_limit_window_seconds: u64,
    pub s3_bucket: String,
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: SecretString,
    pub s3_endpoint: Option<String>,
}

/// Build the login rate limiter; zero attempts turns limiting off.
pub fn rate_limiter(max_attempts: u32, window_seconds: u64) -> Arc<dyn RateLimiter> {
    let window_ms = i64::try_from(window_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
    if max_attempts == 0 {
        warn!("Login rate limiting is disabled");
        Arc::new(NoopRateLimiter::new(max_attempts, window_ms))
    } else {
        Arc::new(SlidingWindowRateLimiter::new(max_attempts, window_ms))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is unusable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.auth_secret, args.app_password)
        .context("Invalid auth configuration")?
        .with_secure_cookies(args.secure_cookies);

    let limiter = rate_limiter(args.rate_limit_max_attempts, args.rate_limit_window_seconds);

    let auth_state = Arc::new(
        AuthState::new(auth_config, limiter).context("Failed to initialize auth state")?,
    );

    let store = S3Store::new(S3Config {
        bucket: args.s3_bucket,
        region: args.aws_region,
        credentials: Credentials {
            access_key_id: args.aws_access_key_id,
            secret_access_key: args.aws_secret_access_key,
        },
        endpoint: args.s3_endpoint,
    })
    .context("Failed to configure object storage")?;
    let media: Arc<dyn MediaStore> = Arc::new(store);

    debug!("Auth state: {:?}", auth_state);

    api::new(args.port, auth_state, media, args.static_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_attempts_disables_limiting() {
        let limiter = rate_limiter(0, 60);
        for _ in 0..20 {
            assert!(limiter.check("198.51.100.9").await.allowed);
        }
    }

    #[tokio::test]
    async fn limiter_enforces_max_attempts() {
        let limiter = rate_limiter(2, 60);
        assert!(limiter.check("198.51.100.9").await.allowed);
        assert!(limiter.check("198.51.100.9").await.allowed);
        let outcome = limiter.check("198.51.100.9").await;
        assert!(!outcome.allowed);
        assert_eq!(outcome.remaining, 0);
    }
}
