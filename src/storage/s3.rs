//! S3-compatible [`MediaStore`] backed by presigned requests.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{
    file_name,
    sigv4::{Credentials, Presigner},
    Disposition, MediaObject, MediaStore, StorageError, PRESIGNED_URL_TTL_SECONDS,
};

// Listing requests are consumed immediately, keep their signature short-lived.
const LIST_URL_TTL_SECONDS: u64 = 60;
const MAX_LIST_PAGES: usize = 1000;

#[derive(Clone, Debug)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub credentials: Credentials,
    /// Path-style endpoint override, e.g. `http://localhost:9000`.
    pub endpoint: Option<String>,
}

#[derive(Debug)]
pub struct S3Store {
    client: Client,
    presigner: Presigner,
    listing: ListingParser,
    max_list_pages: usize,
}

impl S3Store {
    /// # Errors
    /// Returns an error if the endpoint URL is invalid or the HTTP client cannot be built.
    pub fn new(config: S3Config) -> Result<Self, StorageError> {
        let presigner = match config.endpoint {
            Some(endpoint) => {
                let base = Url::parse(&endpoint)
                    .map_err(|err| StorageError::Config(format!("{endpoint}: {err}")))?;
                Presigner::path_style(base, config.bucket, config.region, config.credentials)
            }
            None => {
                let endpoint = format!(
                    "https://{}.s3.{}.amazonaws.com",
                    config.bucket, config.region
                );
                let base = Url::parse(&endpoint)
                    .map_err(|err| StorageError::Config(format!("{endpoint}: {err}")))?;
                Presigner::virtual_hosted(base, config.region, config.credentials)
            }
        };

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            presigner,
            listing: ListingParser::new()?,
            max_list_pages: MAX_LIST_PAGES,
        })
    }

    #[cfg(test)]
    fn with_max_list_pages(mut self, pages: usize) -> Self {
        self.max_list_pages = pages;
        self
    }

    async fn list_page(&self, continuation: Option<&str>) -> Result<ListPage, StorageError> {
        let mut params = vec![("list-type", "2")];
        if let Some(token) = continuation {
            params.push(("continuation-token", token));
        }
        let url = self.presigner.presign_get(
            "",
            &params,
            LIST_URL_TTL_SECONDS,
            OffsetDateTime::now_utc(),
        )?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        self.listing.parse(&body)
    }
}

#[async_trait]
impl MediaStore for S3Store {
    #[instrument(skip(self))]
    async fn list_objects(&self) -> Result<Vec<MediaObject>, StorageError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self.list_page(continuation.as_deref()).await?;
            pages += 1;
            objects.extend(page.objects);
            match page.next {
                None => break,
                Some(_) if pages >= self.max_list_pages => {
                    warn!(
                        pages,
                        objects = objects.len(),
                        "listing truncated, bucket still has more objects"
                    );
                    break;
                }
                Some(token) => continuation = Some(token),
            }
        }

        debug!("listed {} objects", objects.len());
        Ok(objects)
    }

    fn presigned_url(&self, key: &str, disposition: Disposition) -> Result<String, StorageError> {
        let header;
        let params: Vec<(&str, &str)> = match disposition {
            Disposition::Inline => Vec::new(),
            Disposition::Attachment => {
                header = format!("attachment; filename=\"{}\"", file_name(key));
                vec![("response-content-disposition", header.as_str())]
            }
        };
        self.presigner.presign_get(
            key,
            &params,
            PRESIGNED_URL_TTL_SECONDS,
            OffsetDateTime::now_utc(),
        )
    }
}

#[derive(Debug)]
struct ListPage {
    objects: Vec<MediaObject>,
    next: Option<String>,
}

/// Pulls the handful of fields we need out of a `ListObjectsV2` response.
#[derive(Debug)]
struct ListingParser {
    contents: Regex,
    key: Regex,
    size: Regex,
    last_modified: Regex,
    truncated: Regex,
    next_token: Regex,
}

impl ListingParser {
    fn new() -> Result<Self, StorageError> {
        let build = |pattern: &str| {
            Regex::new(pattern).map_err(|err| StorageError::Config(err.to_string()))
        };
        Ok(Self {
            contents: build(r"(?s)<Contents>(.*?)</Contents>")?,
            key: build(r"(?s)<Key>(.*?)</Key>")?,
            size: build(r"<Size>\s*(\d+)\s*</Size>")?,
            last_modified: build(r"<LastModified>\s*([^<]+?)\s*</LastModified>")?,
            truncated: build(r"<IsTruncated>\s*true\s*</IsTruncated>")?,
            next_token: build(r"(?s)<NextContinuationToken>(.*?)</NextContinuationToken>")?,
        })
    }

    fn parse(&self, body: &str) -> Result<ListPage, StorageError> {
        let mut objects = Vec::new();
        for entry in self.contents.captures_iter(body) {
            let entry = entry.get(1).map_or("", |m| m.as_str());
            let key = self
                .capture(&self.key, entry)
                .map(xml_unescape)
                .ok_or_else(|| StorageError::Listing("entry without Key".to_string()))?;
            let size = self
                .capture(&self.size, entry)
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(0);
            let last_modified = match self.capture(&self.last_modified, entry) {
                Some(value) => OffsetDateTime::parse(value, &Rfc3339)
                    .map_err(|err| StorageError::Listing(format!("{key}: {err}")))?,
                None => OffsetDateTime::now_utc(),
            };
            objects.push(MediaObject {
                key,
                size,
                last_modified,
            });
        }

        let next = if self.truncated.is_match(body) {
            self.capture(&self.next_token, body).map(xml_unescape)
        } else {
            None
        };

        Ok(ListPage { objects, next })
    }

    fn capture<'a>(&self, regex: &Regex, haystack: &'a str) -> Option<&'a str> {
        regex
            .captures(haystack)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}

/// Decode the predefined XML entities and numeric character references.
///
/// Anything that does not form a valid reference is kept as written.
fn xml_unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest
            .find(';')
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
