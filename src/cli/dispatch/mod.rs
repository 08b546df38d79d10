//! Map validated CLI arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, storage, ARG_ENVIRONMENT, ARG_PORT, ARG_STATIC_DIR};
use anyhow::Result;
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or blank.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let secure_cookies = matches
        .get_one::<String>(ARG_ENVIRONMENT)
        .map_or(true, |environment| environment == "production");
    let static_dir = matches.get_one::<PathBuf>(ARG_STATIC_DIR).cloned();

    let auth_opts = auth::Options::parse(matches)?;
    let storage_opts = storage::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        secure_cookies,
        static_dir,
        auth_secret: auth_opts.secret,
        app_password: auth_opts.password,
        rate_limit_max_attempts: auth_opts.rate_limit_max_attempts,
        rate_limit_window_seconds: auth_opts.rate_limit_window_seconds,
        s3_bucket: storage_opts.bucket,
        aws_region: storage_opts.region,
        aws_access_key_id: storage_opts.access_key_id,
        aws_secret_access_key: storage_opts.secret_access_key,
        s3_endpoint: storage_opts.endpoint,
    }))
}
