//! Cookie transport for the session and CSRF tokens.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use std::collections::HashMap;

use super::session::SESSION_TTL_MS;

pub const SESSION_COOKIE_NAME: &str = "auth-token";
pub const CSRF_COOKIE_NAME: &str = "csrf-token";
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// 1 hour.
pub const CSRF_TTL_SECONDS: i64 = 60 * 60;
pub const SESSION_TTL_SECONDS: i64 = SESSION_TTL_MS / 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SameSite {
    Lax,
    Strict,
}

impl SameSite {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

/// Attribute profile for the two cookies.
///
/// `secure` is only set in production so local HTTP development keeps working.
#[derive(Clone, Copy, Debug)]
pub struct CookieJar {
    secure: bool,
}

impl CookieJar {
    #[must_use]
    pub const fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// `Set-Cookie` value carrying a session token.
    ///
    /// # Errors
    /// Returns an error if the token contains bytes not allowed in a header.
    pub fn session(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build(SESSION_COOKIE_NAME, token, SameSite::Lax, SESSION_TTL_SECONDS)
    }

    /// `Set-Cookie` value that deletes the session cookie.
    ///
    /// # Errors
    /// Never fails for the fixed cookie name; the signature mirrors the setters.
    pub fn clear_session(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build(SESSION_COOKIE_NAME, "", SameSite::Lax, 0)
    }

    /// `Set-Cookie` value carrying a CSRF token.
    ///
    /// # Errors
    /// Returns an error if the token contains bytes not allowed in a header.
    pub fn csrf(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build(CSRF_COOKIE_NAME, token, SameSite::Strict, CSRF_TTL_SECONDS)
    }

    fn build(
        &self,
        name: &str,
        value: &str,
        same_site: SameSite,
        max_age: i64,
    ) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{name}={value}; Path=/; HttpOnly; SameSite={}; Max-Age={max_age}",
            same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Parse a `Cookie` request header into name/value pairs.
///
/// Segments without `=` are skipped. When a name repeats, the first value wins.
#[must_use]
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        cookies
            .entry(name.to_string())
            .or_insert_with(|| value.trim().to_string());
    }
    cookies
}

/// Read one cookie from the request headers. Absence is `None`, never an error.
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| parse_cookie_header(value).remove(name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = CookieJar::new(true).session("123.abc").unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "auth-token=123.abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800; Secure"
        );
    }

    #[test]
    fn secure_flag_follows_the_jar() {
        for token in ["123.abc", "r.s"] {
            let production = CookieJar::new(true).csrf(token).unwrap();
            let development = CookieJar::new(false).csrf(token).unwrap();
            assert!(production.to_str().unwrap().ends_with("; Secure"));
            assert!(!development.to_str().unwrap().contains("Secure"));
        }
        let cleared = CookieJar::new(true).clear_session().unwrap();
        assert!(cleared.to_str().unwrap().ends_with("Max-Age=0; Secure"));
    }

    #[test]
    fn csrf_cookie_attributes_in_development() {
        let cookie = CookieJar::new(false).csrf("r.s").unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "csrf-token=r.s; Path=/; HttpOnly; SameSite=Strict; Max-Age=3600"
        );
    }

    #[test]
    fn clear_session_expires_immediately() {
        let cookie = CookieJar::new(false).clear_session().unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "auth-token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }

    #[test]
    fn token_with_newline_is_rejected() {
        assert!(CookieJar::new(false).session("bad\nvalue").is_err());
    }

    #[test]
    fn parse_ignores_order_and_spacing() {
        let cookies = parse_cookie_header(" theme=dark ;auth-token=1.ab;  csrf-token=x.y ");
        assert_eq!(cookies.get("auth-token").map(String::as_str), Some("1.ab"));
        assert_eq!(cookies.get("csrf-token").map(String::as_str), Some("x.y"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn parse_keeps_value_after_first_equals() {
        let cookies = parse_cookie_header("data=a=b=c");
        assert_eq!(cookies.get("data").map(String::as_str), Some("a=b=c"));
    }

    #[test]
    fn parse_first_duplicate_wins_and_skips_garbage() {
        let cookies = parse_cookie_header("flag; =orphan; a=1; a=2");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn read_cookie_requires_exact_name() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("xauth-token=nope"));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE_NAME), None);

        headers.append(COOKIE, HeaderValue::from_static("auth-token=yes"));
        assert_eq!(
            read_cookie(&headers, SESSION_COOKIE_NAME),
            Some("yes".to_string())
        );
    }

    #[test]
    fn read_cookie_absent_header() {
        assert_eq!(read_cookie(&HeaderMap::new(), CSRF_COOKIE_NAME), None);
    }
}
