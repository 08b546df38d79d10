//! Auth endpoints: CSRF token fetch, password login and logout.
//!
//! ## Login flow
//!
//! 1. The browser fetches `GET /api/auth/csrf`, which sets the `csrf-token`
//!    cookie (strict same-site, one hour) and echoes the value.
//! 2. The form posts `{"password": ...}` to `POST /api/auth/login` with the
//!    echoed value in `X-CSRF-Token`.
//! 3. On success the `auth-token` session cookie is set for seven days.
//!
//! Login attempts are rate limited per client IP before anything else runs.

pub mod csrf;
pub mod login;
pub mod logout;
mod state;
mod utils;

pub use state::AuthState;

#[cfg(test)]
mod tests;
