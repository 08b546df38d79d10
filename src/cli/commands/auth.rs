use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::rate_limit::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MS};

pub const ARG_AUTH_SECRET: &str = "auth-secret";
pub const ARG_APP_PASSWORD: &str = "app-password";
pub const ARG_RATE_LIMIT_MAX_ATTEMPTS: &str = "rate-limit-max-attempts";
pub const ARG_RATE_LIMIT_WINDOW_SECONDS: &str = "rate-limit-window-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub secret: SecretString,
    pub password: SecretString,
    pub rate_limit_max_attempts: u32,
    pub rate_limit_window_seconds: u64,
}

impl Options {
    /// Parse auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the secret or password is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let required = |id: &str| -> anyhow::Result<SecretString> {
            match matches.get_one::<String>(id) {
                Some(value) if !value.is_empty() => Ok(SecretString::from(value.clone())),
                _ => anyhow::bail!("missing required argument: --{id}"),
            }
        };

        Ok(Self {
            secret: required(ARG_AUTH_SECRET)?,
            password: required(ARG_APP_PASSWORD)?,
            rate_limit_max_attempts: matches
                .get_one::<u32>(ARG_RATE_LIMIT_MAX_ATTEMPTS)
                .copied()
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            rate_limit_window_seconds: matches
                .get_one::<u64>(ARG_RATE_LIMIT_WINDOW_SECONDS)
                .copied()
                .unwrap_or(DEFAULT_WINDOW_MS.unsigned_abs() / 1000),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_SECRET)
                .long(ARG_AUTH_SECRET)
                .help("Secret used to sign session and CSRF tokens")
                .env("AUTH_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_APP_PASSWORD)
                .long(ARG_APP_PASSWORD)
                .help("Shared password that unlocks the site")
                .env("APP_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_MAX_ATTEMPTS)
                .long(ARG_RATE_LIMIT_MAX_ATTEMPTS)
                .help("Login attempts allowed per client per window, 0 disables limiting")
                .env("REELGATE_RATE_LIMIT_MAX_ATTEMPTS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_WINDOW_SECONDS)
                .long(ARG_RATE_LIMIT_WINDOW_SECONDS)
                .help("Length of the login rate limit window in seconds")
                .env("REELGATE_RATE_LIMIT_WINDOW_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
