//! URL utilities for manifest synthesis and logging
//!
//! This module provides the stream-URL escaping used when embedding media
//! URLs in manifest text, and obfuscation of volatile access tokens so
//! media URLs can be logged safely.

use std::borrow::Cow;

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Prepare a media URL for embedding in manifest markup
    ///
    /// The URL is percent-decoded exactly once, then the four markup
    /// characters are escaped. Ampersand must be escaped first so the
    /// entities introduced for the other three characters are not
    /// re-escaped into `&amp;amp;` forms.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dash_bridge::utils::url::UrlUtils;
    ///
    /// assert_eq!(
    ///     UrlUtils::escape_stream_url("https://cdn.example/v?a=1&b=%3Cc%3E"),
    ///     "https://cdn.example/v?a=1&amp;b=&lt;c&gt;"
    /// );
    /// ```
    pub fn escape_stream_url(url: &str) -> String {
        let decoded = match urlencoding::decode(url) {
            Ok(decoded) => decoded,
            // Percent sequences that do not decode to UTF-8 are left as-is
            Err(_) => Cow::Borrowed(url),
        };
        Self::escape_markup(&decoded)
    }

    /// Escape the four characters that break manifest markup
    pub fn escape_markup(input: &str) -> String {
        input
            .replace('&', "&amp;")
            .replace('"', "&quot;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// Obfuscate volatile access tokens in media URLs for safe logging
    ///
    /// Extracted media URLs carry per-request signature material that should
    /// not land in logs verbatim.
    pub fn obfuscate_stream_tokens(url: &str) -> String {
        use regex::Regex;

        let sensitive_params = ["sig", "signature", "lsig", "pot", "ip"];

        let mut obfuscated = url.to_string();
        for param in &sensitive_params {
            let pattern = format!(r"(?i)([?&]{}=)[^&]*", regex::escape(param));
            if let Ok(re) = Regex::new(&pattern) {
                obfuscated = re.replace_all(&obfuscated, "${1}****").to_string();
            }
        }

        obfuscated
    }
}
