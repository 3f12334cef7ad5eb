//! URL template substitution, base URI joining, and query string encoding.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

use crate::error::ConfigError;

/// Characters escaped inside a substituted path segment. Braces are always
/// escaped so a substituted value can never reintroduce a placeholder.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Everything but RFC 3986 unreserved characters.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Replace every `{name}` in `template` with the encoded value `lookup`
/// returns for it.
///
/// Returns the substituted string and the placeholder names that were used,
/// in order of first appearance.
pub fn substitute<'a, F>(template: &str, lookup: F) -> Result<(String, Vec<String>), ConfigError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(template.len());
    let mut used: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| ConfigError::MalformedTemplate {
            template: template.to_string(),
            reason: "unclosed `{`".to_string(),
        })?;
        let name = after[..close].trim();
        if name.is_empty() {
            return Err(ConfigError::MalformedTemplate {
                template: template.to_string(),
                reason: "empty placeholder `{}`".to_string(),
            });
        }
        let value = lookup(name).ok_or_else(|| ConfigError::MissingPathParam {
            name: name.to_string(),
            template: template.to_string(),
        })?;
        out.extend(utf8_percent_encode(value, PATH_SEGMENT));
        if !used.iter().any(|seen| seen == name) {
            used.push(name.to_string());
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok((out, used))
}

/// Whether `url` carries its own scheme and authority.
pub fn is_absolute(url: &str) -> bool {
    match url.find("://") {
        Some(pos) => pos > 0 && url[..pos].chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)),
        None => false,
    }
}

/// Join `path` onto `base_uri` (and `base_path`) with exactly one `/` at
/// each seam.
pub fn join(base_uri: &str, base_path: Option<&str>, path: &str) -> String {
    let mut url = base_uri.trim_end_matches('/').to_string();
    if let Some(base_path) = base_path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        url.push('/');
        url.push_str(base_path);
    }
    let path = path.trim_start_matches('/');
    if !path.is_empty() {
        url.push('/');
        url.push_str(path);
    }
    url
}

/// Append `key=value` pairs, choosing `?` or `&` based on whether `url`
/// already has a query string.
pub fn append_query(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let mut out = url.to_string();
    let mut separator = if url.contains('?') {
        if url.ends_with('?') || url.ends_with('&') {
            None
        } else {
            Some('&')
        }
    } else {
        Some('?')
    };
    for (key, value) in params {
        if let Some(sep) = separator {
            out.push(sep);
        }
        out.extend(utf8_percent_encode(key, QUERY_COMPONENT));
        out.push('=');
        out.extend(utf8_percent_encode(value, QUERY_COMPONENT));
        separator = Some('&');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<&'a str> {
        move |name: &str| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    #[test]
    fn substitutes_named_placeholders() {
        let (url, used) = substitute(
            "http://jsonplaceholder.typicode.com/users/{userId}",
            params(&[("userId", "1")]),
        )
        .unwrap();
        assert_eq!(url, "http://jsonplaceholder.typicode.com/users/1");
        assert_eq!(used, vec!["userId".to_string()]);
    }

    #[test]
    fn repeated_placeholder_is_used_once() {
        let (url, used) = substitute("/{id}/x/{id}", params(&[("id", "7")])).unwrap();
        assert_eq!(url, "/7/x/7");
        assert_eq!(used.len(), 1);
    }

    #[test]
    fn values_are_path_encoded() {
        let (url, _) = substitute("/search/{q}", params(&[("q", "a b/{c}")])).unwrap();
        assert_eq!(url, "/search/a%20b%2F%7Bc%7D");
    }

    #[test]
    fn missing_value_is_config_error() {
        let err = substitute("/users/{userId}", params(&[])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingPathParam {
                name: "userId".to_string(),
                template: "/users/{userId}".to_string(),
            }
        );
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(matches!(
            substitute("/users/{userId", params(&[("userId", "1")])),
            Err(ConfigError::MalformedTemplate { .. })
        ));
        assert!(matches!(
            substitute("/users/{}", params(&[])),
            Err(ConfigError::MalformedTemplate { .. })
        ));
    }

    #[test]
    fn detects_absolute_urls() {
        assert!(is_absolute("http://md5.jsontest.com"));
        assert!(is_absolute("https://example.com/a"));
        assert!(!is_absolute("/users/1"));
        assert!(!is_absolute("users/1"));
        assert!(!is_absolute("/redirect?to=http://x"));
    }

    #[test]
    fn join_uses_single_slashes() {
        assert_eq!(
            join("http://jsonplaceholder.typicode.com/", None, "/users/1"),
            "http://jsonplaceholder.typicode.com/users/1"
        );
        assert_eq!(
            join("http://localhost:3000", Some("/api/"), "users"),
            "http://localhost:3000/api/users"
        );
        assert_eq!(join("http://localhost:3000/", None, ""), "http://localhost:3000");
    }

    #[test]
    fn appends_encoded_query() {
        let q = vec![
            ("text".to_string(), "testcase".to_string()),
            ("q".to_string(), "a b&c".to_string()),
        ];
        assert_eq!(
            append_query("http://md5.jsontest.com", &q),
            "http://md5.jsontest.com?text=testcase&q=a%20b%26c"
        );
        assert_eq!(
            append_query("http://x/y?page=2", &q[..1]),
            "http://x/y?page=2&text=testcase"
        );
        assert_eq!(append_query("http://x/y", &[]), "http://x/y");
    }
}
