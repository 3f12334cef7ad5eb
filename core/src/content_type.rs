//! Well-known content types and how a response header is matched against them.

use std::fmt;

/// A family of mime types accepted for one logical content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Matches any response, including one without a `Content-Type` header.
    Any,
    Text,
    Json,
    Xml,
    Html,
    UrlEncoded,
    Binary,
}

impl ContentType {
    /// Mime types this content type accepts. The first one is used when a
    /// request declares the content type of its body.
    pub const fn mime_types(self) -> &'static [&'static str] {
        match self {
            ContentType::Any => &["*/*"],
            ContentType::Text => &["text/plain"],
            ContentType::Json => &[
                "application/json",
                "application/javascript",
                "text/javascript",
                "text/json",
            ],
            ContentType::Xml => &["application/xml", "text/xml", "application/xhtml+xml"],
            ContentType::Html => &["text/html"],
            ContentType::UrlEncoded => &["application/x-www-form-urlencoded"],
            ContentType::Binary => &["application/octet-stream"],
        }
    }

    /// Whether a raw `Content-Type` header value belongs to this family.
    ///
    /// Parameters after `;` (e.g. `charset`) are ignored and the comparison
    /// is case-insensitive.
    pub fn matches(self, header: Option<&str>) -> bool {
        if self == ContentType::Any {
            return true;
        }
        let Some(header) = header else {
            return false;
        };
        let mime = header.split(';').next().unwrap_or_default().trim();
        self.mime_types()
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(mime))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Any => "ANY",
            ContentType::Text => "TEXT",
            ContentType::Json => "JSON",
            ContentType::Xml => "XML",
            ContentType::Html => "HTML",
            ContentType::UrlEncoded => "URLENC",
            ContentType::Binary => "BINARY",
        };
        f.write_str(name)
    }
}
