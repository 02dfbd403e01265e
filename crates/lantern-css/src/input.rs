//! Decoded stylesheet text together with where it came from.
//!
//! [§ 3.2 The input byte stream](https://www.w3.org/TR/css-syntax-3/#input-byte-stream)
//!
//! Only the first steps of the encoding determination are implemented:
//! an explicitly declared encoding wins, then the charset reported by the
//! transport, then a byte order mark, then UTF-8. `@charset` is not sniffed.
//! Labels are resolved with [`encoding_rs`], so `latin1` and `iso-8859-1`
//! mean windows-1252 as in browsers.

use encoding_rs::{Encoding, UTF_8};
use url::Url;

use crate::tokenizer::INLINE_LOCATION;

/// Stylesheet text ready for tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssInput {
    /// The decoded text.
    pub text: String,
    /// Base URL for resolving imports, if known.
    pub base: Option<Url>,
}

impl CssInput {
    /// Wrap text that is already decoded.
    #[must_use]
    pub fn from_text(text: impl Into<String>, base: Option<Url>) -> Self {
        Self {
            text: text.into(),
            base,
        }
    }

    /// Decode fetched bytes.
    ///
    /// `declared` is the caller's encoding override, `charset` the label
    /// reported with the bytes. Unsupported labels are logged and skipped.
    #[must_use]
    pub fn from_bytes(
        bytes: &[u8],
        declared: Option<&str>,
        charset: Option<&str>,
        base: Option<Url>,
    ) -> Self {
        let location = base.as_ref().map_or(INLINE_LOCATION, Url::as_str);

        let labelled = [declared, charset].into_iter().flatten().find_map(|label| {
            let encoding = Encoding::for_label(label.trim().as_bytes());
            if encoding.is_none() {
                log::warn!("{location}: unsupported encoding `{label}`, ignoring it");
            }
            encoding
        });

        // [§ 3.2](https://www.w3.org/TR/css-syntax-3/#input-byte-stream):
        // without a label, a BOM picks the encoding, otherwise UTF-8.
        let (text, encoding, had_errors) = match labelled {
            Some(encoding) => {
                let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
                (text, encoding, had_errors)
            }
            None => UTF_8.decode(bytes),
        };
        if had_errors {
            log::debug!(
                "{location}: replaced malformed {} sequences",
                encoding.name()
            );
        }
        let text = text.into_owned();

        Self { text, base }
    }

    /// Location used in diagnostics.
    #[must_use]
    pub fn location(&self) -> &str {
        self.base.as_ref().map_or(INLINE_LOCATION, Url::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_encoding_overrides_charset() {
        let input = CssInput::from_bytes(b"a{content:\"\xE9\"}", Some("latin1"), Some("utf-8"), None);
        assert_eq!(input.text, "a{content:\"\u{e9}\"}");
    }

    #[test]
    fn bom_is_stripped() {
        let input = CssInput::from_bytes(b"\xEF\xBB\xBFa{}", None, None, None);
        assert_eq!(input.text, "a{}");
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        let input = CssInput::from_bytes("é".as_bytes(), Some("klingon"), None, None);
        assert_eq!(input.text, "é");
    }

    #[test]
    fn windows_1252_maps_the_c1_range() {
        let input = CssInput::from_bytes(b"a{content:\"\x80\x96\"}", None, Some("windows-1252"), None);
        assert_eq!(input.text, "a{content:\"\u{20ac}\u{2013}\"}");
    }

    #[test]
    fn other_single_byte_encodings_are_decoded() {
        let input = CssInput::from_bytes(b"\xB9", Some("iso-8859-2"), None, None);
        assert_eq!(input.text, "\u{161}");
    }

    #[test]
    fn utf16_bom_is_sniffed_without_a_label() {
        let input = CssInput::from_bytes(b"\xFF\xFEa\x00{\x00}\x00", None, None, None);
        assert_eq!(input.text, "a{}");
    }
}
