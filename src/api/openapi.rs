use super::handlers::{
    auth::{
        csrf::{self, CsrfResponse},
        login::{self, LoginRequest},
        logout,
    },
    videos::{self, Video, VideoUrlResponse},
    ErrorResponse, SuccessResponse,
};
use utoipa::{
    openapi::{Contact, License},
    OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        csrf::csrf,
        login::login,
        logout::logout,
        videos::list,
        videos::url
    ),
    components(schemas(
        CsrfResponse,
        LoginRequest,
        SuccessResponse,
        ErrorResponse,
        Video,
        VideoUrlResponse
    )),
    tags(
        (name = "auth", description = "Password login, CSRF tokens and logout"),
        (name = "videos", description = "Video listing and presigned URLs")
    )
)]
pub struct ApiDoc;

/// The generated document with package metadata filled in from Cargo.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = optional_str(env!("CARGO_PKG_DESCRIPTION")).map(str::to_string);
    doc.info.contact = cargo_contact();
    doc.info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });
    doc
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `:` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(':').next().map(str::trim)?;
    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }
    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_author<'a>(author: &'a str) -> (Option<&'a str>, Option<&'a str>) {
    let non_empty = |s: &'a str| {
        let s = s.trim();
        (!s.is_empty()).then_some(s)
    };
    match author.split_once('<') {
        Some((name, email)) => (non_empty(name), non_empty(email.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}
