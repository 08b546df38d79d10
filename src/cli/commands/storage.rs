use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_S3_BUCKET: &str = "s3-bucket";
pub const ARG_AWS_REGION: &str = "aws-region";
pub const ARG_AWS_ACCESS_KEY_ID: &str = "aws-access-key-id";
pub const ARG_AWS_SECRET_ACCESS_KEY: &str = "aws-secret-access-key";
pub const ARG_S3_ENDPOINT: &str = "s3-endpoint";

#[derive(Debug, Clone)]
pub struct Options {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub endpoint: Option<String>,
}

impl Options {
    /// Parse object storage arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the bucket or credentials are missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // clap passes "" through when the env var is set but empty
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };
        let required = |id: &str| {
            get_non_empty(id)
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            bucket: required(ARG_S3_BUCKET)?,
            region: required(ARG_AWS_REGION)?,
            access_key_id: required(ARG_AWS_ACCESS_KEY_ID)?,
            secret_access_key: SecretString::from(required(ARG_AWS_SECRET_ACCESS_KEY)?),
            endpoint: get_non_empty(ARG_S3_ENDPOINT),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_S3_BUCKET)
                .long(ARG_S3_BUCKET)
                .help("Bucket holding the videos")
                .env("S3_BUCKET_NAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_AWS_REGION)
                .long(ARG_AWS_REGION)
                .help("Bucket region")
                .env("AWS_REGION")
                .default_value("us-east-2"),
        )
        .arg(
            Arg::new(ARG_AWS_ACCESS_KEY_ID)
                .long(ARG_AWS_ACCESS_KEY_ID)
                .help("Access key id used to sign storage requests")
                .env("AWS_ACCESS_KEY_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_AWS_SECRET_ACCESS_KEY)
                .long(ARG_AWS_SECRET_ACCESS_KEY)
                .help("Secret access key used to sign storage requests")
                .env("AWS_SECRET_ACCESS_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_S3_ENDPOINT)
                .long(ARG_S3_ENDPOINT)
                .help("Path-style endpoint for S3-compatible stores")
                .long_help(
                    "Path-style endpoint for S3-compatible stores, example: http://localhost:9000\n\nWhen unset, virtual-hosted AWS URLs are used.",
                )
                .env("S3_ENDPOINT"),
        )
}
