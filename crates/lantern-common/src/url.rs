//! URL resolution utilities.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! The CSS pipeline resolves two kinds of URLs: the base of a stylesheet
//! (which also roots the import cache keys) and the target of each
//! `@import`. Both go through a [`UrlResolver`] so embedders can map them
//! onto their own resource scheme.

use std::path::Path;

use thiserror::Error;
use url::Url;

/// Failure to resolve a URL.
#[derive(Debug, Error)]
pub enum UrlError {
    /// The string is not a valid URL and could not be joined to a base.
    #[error("invalid URL `{input}`: {source}")]
    Parse {
        /// The offending input.
        input: String,
        /// Underlying parser error.
        #[source]
        source: url::ParseError,
    },

    /// A relative reference was given but there is no base to resolve it
    /// against.
    #[error("relative URL `{0}` has no base to resolve against")]
    MissingBase(String),

    /// A base given as a filesystem path could not be turned into a URL.
    #[error("path `{0}` cannot be expressed as a file URL")]
    InvalidPath(String),
}

/// Resolves base URLs and `@import` targets.
pub trait UrlResolver: Send + Sync {
    /// Resolve the base URL of a stylesheet from the string given by the
    /// caller (a URL, or a filesystem path).
    ///
    /// # Errors
    ///
    /// Returns a [`UrlError`] when `base` cannot be interpreted.
    fn resolve_base(&self, base: &str) -> Result<Url, UrlError>;

    /// Resolve the target of an `@import` found in a stylesheet located at
    /// `base`.
    ///
    /// # Errors
    ///
    /// Returns a [`UrlError`] when `href` is relative and there is no base,
    /// or when the joined URL is invalid.
    fn resolve_import_target(&self, base: Option<&Url>, href: &str) -> Result<Url, UrlError>;
}

/// [§ 4.3 URL parsing](https://url.spec.whatwg.org/#url-parsing)
///
/// Resolver backed by the WHATWG URL parser.
///
/// Absolute references are returned as-is, relative ones are joined to the
/// base. A base that does not parse as a URL is taken to be a filesystem
/// path and converted to a `file:` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUrlResolver;

impl DefaultUrlResolver {
    /// Create the default resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UrlResolver for DefaultUrlResolver {
    fn resolve_base(&self, base: &str) -> Result<Url, UrlError> {
        match Url::parse(base) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => file_url(Path::new(base)),
            Err(source) => Err(UrlError::Parse {
                input: base.to_string(),
                source,
            }),
        }
    }

    fn resolve_import_target(&self, base: Option<&Url>, href: &str) -> Result<Url, UrlError> {
        let href = href.trim();

        // STEP 1: "If url is an absolute URL, return url."
        match Url::parse(href) {
            Ok(url) => return Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {}
            Err(source) => {
                return Err(UrlError::Parse {
                    input: href.to_string(),
                    source,
                });
            }
        }

        // STEP 2: "Otherwise, resolve url relative to base."
        let Some(base) = base else {
            return Err(UrlError::MissingBase(href.to_string()));
        };
        base.join(href).map_err(|source| UrlError::Parse {
            input: href.to_string(),
            source,
        })
    }
}

/// Turn a (possibly relative) filesystem path into a `file:` URL.
fn file_url(path: &Path) -> Result<Url, UrlError> {
    let absolute = std::path::absolute(path)
        .map_err(|_| UrlError::InvalidPath(path.display().to_string()))?;
    Url::from_file_path(&absolute).map_err(|()| UrlError::InvalidPath(path.display().to_string()))
}
