//! # Reelgate
//!
//! A password-gated front end for browsing videos kept in object storage.
//!
//! ## Authentication
//!
//! There are no user accounts. One shared password unlocks the site and one
//! shared secret signs everything the server hands out:
//!
//! - the **session token** in the `auth-token` cookie, valid for seven days;
//! - the **CSRF token** in the `csrf-token` cookie, which the login form must
//!   echo in `X-CSRF-Token`.
//!
//! Both are stateless HMAC-SHA256 tokens, see [`auth`]. Every request passes
//! through [`api::gate`], which redirects to `/login` unless the path is public
//! or the session cookie verifies.
//!
//! ## Media
//!
//! Videos are listed from an S3-compatible bucket and streamed straight from it
//! through presigned URLs, see [`storage`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod rate_limit;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
