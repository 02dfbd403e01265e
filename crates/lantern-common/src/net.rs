//! Fetch utilities for the Lantern CSS pipeline.
//!
//! The parser never touches sockets or files itself. It asks a
//! [`NetworkProcessor`] for the bytes behind a URL; [`DefaultNetworkProcessor`]
//! serves `http`/`https` with a blocking HTTP client, `file` from disk and
//! `data` URLs inline.

use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;
use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

/// User-Agent header sent with all requests.
///
/// Mimics a common desktop browser to avoid basic bot detection.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to retrieve a resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP error {status} for {url}")]
    Status {
        /// The requested URL.
        url: String,
        /// The status code returned.
        status: reqwest::StatusCode,
    },

    /// A local file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A `file:` URL does not map onto a local path.
    #[error("URL {0} does not name a local file")]
    NotAFile(String),

    /// A `data:` URL is malformed.
    #[error("invalid data URL: {0}")]
    DataUrl(String),

    /// No handler for the URL scheme.
    #[error("unsupported URL scheme `{0}`")]
    UnsupportedScheme(String),
}

/// The body of a fetched resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fetched {
    /// Raw bytes of the resource.
    pub bytes: Vec<u8>,
    /// Charset label reported alongside the resource, if any
    /// (`Content-Type` parameter or `data:` metadata).
    pub charset: Option<String>,
}

impl Fetched {
    /// Wrap raw bytes with no charset information.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            charset: None,
        }
    }

    /// Attach a charset label.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }
}

/// Retrieves the bytes behind a URL.
///
/// Implementations are called synchronously from the parser while it
/// expands `@import` rules, so a slow fetch blocks the whole parse.
pub trait NetworkProcessor: Send + Sync {
    /// Fetch `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the resource cannot be retrieved.
    fn fetch(&self, url: &Url) -> Result<Fetched, FetchError>;
}

/// Network collaborator serving `http`, `https`, `file` and `data` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNetworkProcessor;

impl DefaultNetworkProcessor {
    /// Create the default network processor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fetch_http(url: &Url) -> Result<Fetched, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(FetchError::Client)?;

        let response = client
            .get(url.as_str())
            .header("User-Agent", USER_AGENT)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);

        let bytes = response.bytes().map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        Ok(Fetched {
            bytes: bytes.to_vec(),
            charset,
        })
    }

    fn fetch_file(url: &Url) -> Result<Fetched, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::NotAFile(url.to_string()))?;
        let bytes = std::fs::read(&path).map_err(|source| FetchError::Io { path, source })?;
        Ok(Fetched::new(bytes))
    }
}

impl NetworkProcessor for DefaultNetworkProcessor {
    fn fetch(&self, url: &Url) -> Result<Fetched, FetchError> {
        log::debug!("fetching {url}");
        match url.scheme() {
            "http" | "https" => Self::fetch_http(url),
            "file" => Self::fetch_file(url),
            "data" => DataUrl::new(url.as_str()).decode(),
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// A parsed `data:` URL that can be decoded into raw bytes.
pub struct DataUrl<'a> {
    /// The full raw `data:` URL string (e.g. `data:text/css;base64,...`).
    raw: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Wrap a raw `data:` URL string.
    #[must_use]
    pub const fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Decode the payload, honouring `;base64` and percent-encoding, and
    /// report the `charset=` parameter of the metadata if present.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DataUrl`] if the URL has no payload separator or
    /// the base64 payload is invalid.
    pub fn decode(&self) -> Result<Fetched, FetchError> {
        let body = self
            .raw
            .strip_prefix("data:")
            .ok_or_else(|| FetchError::DataUrl("missing `data:` prefix".to_string()))?;
        let Some((metadata, data)) = body.split_once(',') else {
            return Err(FetchError::DataUrl("missing comma".to_string()));
        };

        let charset = metadata
            .split(';')
            .filter_map(|param| param.trim().split_once('='))
            .find(|(name, _)| name.eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.to_string());

        let bytes = if metadata.ends_with(";base64") {
            base64::engine::general_purpose::STANDARD
                .decode(percent_decode(data))
                .map_err(|e| FetchError::DataUrl(format!("base64 decode error: {e}")))?
        } else {
            percent_decode(data)
        };

        Ok(Fetched { bytes, charset })
    }
}

/// Extract the `charset` parameter from a `Content-Type` header value.
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// Decode `%XX` sequences; malformed sequences are kept verbatim.
fn percent_decode(input: &str) -> Vec<u8> {
    percent_decode_str(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_is_read_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/css; charset=\"ISO-8859-1\""),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(charset_from_content_type("text/css"), None);
    }

    #[test]
    fn percent_decoding_keeps_malformed_sequences() {
        assert_eq!(percent_decode("a%20b"), b"a b".to_vec());
        assert_eq!(percent_decode("100%"), b"100%".to_vec());
        assert_eq!(percent_decode("%zz"), b"%zz".to_vec());
        assert_eq!(percent_decode("%E2%82%AC"), "\u{20ac}".as_bytes().to_vec());
    }
}
