//! Process-wide auth configuration, loaded once at startup.

use secrecy::{ExposeSecret, SecretString};

use super::{compare::timing_safe_str_eq, error::ConfigError};

#[derive(Clone)]
pub struct AuthConfig {
    secret: SecretString,
    password: SecretString,
    secure_cookies: bool,
}

impl AuthConfig {
    /// # Errors
    /// Returns an error if either value is empty.
    pub fn new(secret: SecretString, password: SecretString) -> Result<Self, ConfigError> {
        if secret.expose_secret().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if password.expose_secret().is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        Ok(Self {
            secret,
            password,
            secure_cookies: true,
        })
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.secret
    }

    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Compare a login attempt with the shared password in constant time.
    #[must_use]
    pub fn validate_password(&self, candidate: &str) -> bool {
        timing_safe_str_eq(candidate, self.password.expose_secret())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"***")
            .field("password", &"***")
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new(
            SecretString::from("s3cr3t".to_string()),
            SecretString::from("open sesame".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn validate_password() {
        let config = config();
        assert!(config.validate_password("open sesame"));
        assert!(!config.validate_password("open sesamex"));
        assert!(!config.validate_password("open sesam"));
        assert!(!config.validate_password("Open sesame"));
        assert!(!config.validate_password(""));
    }

    #[test]
    fn password_checks_walk_the_longer_input() {
        use crate::auth::compare::count_steps;

        let config = config();
        let expected = "open sesame".len();

        let (accepted, exact) = count_steps(|| config.validate_password("open sesame"));
        assert!(accepted);
        let (accepted, suffixed) = count_steps(|| config.validate_password("open sesamex"));
        assert!(!accepted);
        let (accepted, early) = count_steps(|| config.validate_password("Xpen sesame"));
        assert!(!accepted);
        let (accepted, late) = count_steps(|| config.validate_password("open sesamX"));
        assert!(!accepted);

        assert_eq!(exact, expected);
        assert_eq!(suffixed, expected + 1);
        assert_eq!(early, expected);
        assert_eq!(late, expected);
    }

    #[test]
    fn empty_values_rejected() {
        let empty = || SecretString::from(String::new());
        let value = || SecretString::from("x".to_string());
        assert!(matches!(
            AuthConfig::new(empty(), value()),
            Err(ConfigError::EmptySecret)
        ));
        assert!(matches!(
            AuthConfig::new(value(), empty()),
            Err(ConfigError::EmptyPassword)
        ));
    }

    #[test]
    fn secure_cookies_default_on() {
        assert!(config().secure_cookies());
        assert!(!config().with_secure_cookies(false).secure_cookies());
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("s3cr3t"));
        assert!(!rendered.contains("open sesame"));
    }
}
