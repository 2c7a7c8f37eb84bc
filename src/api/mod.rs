pub mod types;

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Response;
use thiserror::Error;

use crate::config::AppConfig;
use crate::search::PageKey;
use types::{SearchEntry, parse_page};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {detail}")]
    ApiError { status: u16, detail: String },
    #[error("deserialization error: {0}")]
    Deserialize(String),
}

/// One fetched page: entries in backend order, or `None` when the backend
/// answered `null`.
pub type Page = Option<Vec<SearchEntry>>;

// ---------------------------------------------------------------------------
// Query parameter helpers
// ---------------------------------------------------------------------------

/// Percent-encoding set for URL query values (encode everything except unreserved chars).
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_query(s: &str) -> String {
    utf8_percent_encode(s, QUERY_ENCODE_SET).to_string()
}

const SEARCH_PATH: &str = "/api/s";

/// Request path for one page, e.g. `/api/s?q=cats&p=2`.
pub fn page_path(key: &PageKey) -> String {
    format!("{SEARCH_PATH}?q={}&p={}", encode_query(&key.term), key.page)
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

pub struct SearchClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiClientError> {
        Self::new(
            &config.base_url,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a front-end path (e.g. "/watch?v=abc").
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetch one page of search results.
    pub async fn fetch_page(&self, key: &PageKey) -> Result<Page, ApiClientError> {
        let url = self.url(&page_path(key));
        tracing::debug!(%url, "fetching search page");

        let resp = self.http_client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Check status and decode the page body.
    async fn handle_response(&self, resp: Response) -> Result<Page, ApiClientError> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %body, "search request failed");
            return Err(ApiClientError::ApiError {
                status: status.as_u16(),
                detail: body_excerpt(&body),
            });
        }

        let body = resp.text().await?;
        decode_page(&body)
    }
}

/// Longest slice of a response body carried in an error message.
const BODY_EXCERPT_CHARS: usize = 200;

fn body_excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_owned(),
    }
}

/// Decode a response body: a JSON array of tagged entries, or `null`.
///
/// Entries with a missing or unknown tag are skipped with a warning.
pub fn decode_page(body: &str) -> Result<Page, ApiClientError> {
    let values =
        serde_json::from_str::<Option<Vec<serde_json::Value>>>(body).map_err(|e| {
            tracing::debug!(%body, "undecodable search response");
            ApiClientError::Deserialize(format!("{e}: {}", body_excerpt(body)))
        })?;

    let (page, rejected) = parse_page(values);
    for (index, error) in &rejected {
        tracing::warn!(index, %error, "skipping search entry");
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(term: &str, page: u32) -> PageKey {
        PageKey {
            term: term.to_owned(),
            page,
        }
    }

    #[test]
    fn page_path_matches_endpoint_shape() {
        assert_eq!(page_path(&key("cats", 1)), "/api/s?q=cats&p=1");
        assert_eq!(page_path(&key("cats", 2)), "/api/s?q=cats&p=2");
    }

    #[test]
    fn page_path_encodes_term() {
        assert_eq!(
            page_path(&key("rust & c++", 3)),
            "/api/s?q=rust%20%26%20c%2B%2B&p=3"
        );
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = SearchClient::new("http://localhost:3000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.url(&page_path(&key("dogs", 1))),
            "http://localhost:3000/api/s?q=dogs&p=1"
        );
    }

    #[test]
    fn decode_null_body() {
        assert_eq!(decode_page("null").unwrap(), None);
    }

    #[test]
    fn decode_mixed_page() {
        let body = r#"[
            {"type": "video", "videoId": "v1", "title": "a"},
            {"type": "channel", "authorId": "c1", "author": "b"}
        ]"#;
        let page = decode_page(body).unwrap().unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].key(), "v1");
        assert_eq!(page[1].key(), "c1");
    }

    #[test]
    fn decode_rejects_object_body() {
        let err = decode_page(r#"{"error": "nope"}"#).unwrap_err();
        assert!(matches!(err, ApiClientError::Deserialize(_)));
    }

    #[test]
    fn decode_skips_unknown_entry() {
        let body = r#"[{"type": "movie", "id": "m"}, {"type": "video", "videoId": "v1"}]"#;
        let page = decode_page(body).unwrap().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].key(), "v1");
    }

    #[test]
    fn decode_error_quotes_only_start_of_body() {
        let body = format!("<html>{}</html>", "x".repeat(5000));
        let err = decode_page(&body).unwrap_err().to_string();
        assert!(err.contains("<html>"));
        assert!(err.ends_with("..."));
        assert!(err.len() < 400);
    }

    #[test]
    fn short_body_is_quoted_whole() {
        assert_eq!(body_excerpt("not found"), "not found");
        assert_eq!(body_excerpt(&"é".repeat(300)).chars().count(), BODY_EXCERPT_CHARS + 3);
    }
}
