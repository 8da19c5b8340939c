//! Path normalization and URL assembly.
//!
//! All functions here are pure string algebra; nothing touches the
//! filesystem or the network.

use indexmap::IndexMap;
use url::Url;

use crate::error::{DomainError, DomainResult};

const SEPARATOR: char = '/';

/// Joins `base` and `path` and canonicalizes the result.
///
/// Repeated separators, `.` segments and `..` segments are collapsed
/// (`..` never climbs above the root). The root itself is represented
/// as `None`, so a node mounted at `/` has no path.
///
/// ```
/// use restdoc_domain::path::normalize;
///
/// assert_eq!(normalize("users//:id/", Some("/api")).as_deref(), Some("/api/users/:id"));
/// assert_eq!(normalize("/", None), None);
/// assert_eq!(normalize("a/../..", None), None);
/// ```
#[must_use]
pub fn normalize(path: &str, base: Option<&str>) -> Option<String> {
    let base = base.unwrap_or("/");
    let mut segments: Vec<&str> = Vec::new();

    for segment in base.split(SEPARATOR).chain(path.split(SEPARATOR)) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(format!("/{}", segments.join("/")))
    }
}

/// Joins an optional base path and an optional relative path.
///
/// Convenience over [`normalize`] for callers holding `Option<String>` paths.
#[must_use]
pub fn join(base: Option<&str>, path: Option<&str>) -> Option<String> {
    normalize(path.unwrap_or(""), base)
}

/// Replaces `:name`, `*name` and bare `*` segments with percent-encoded values.
///
/// Bare `*` segments look up the parameter named `*`. Placeholders without a
/// value are left untouched so the mismatch surfaces in the test report.
#[must_use]
pub fn substitute_parameters(template: &str, params: &IndexMap<String, String>) -> String {
    template
        .split(SEPARATOR)
        .map(|segment| {
            let name = segment
                .strip_prefix(':')
                .or_else(|| segment.strip_prefix('*').map(|n| if n.is_empty() { "*" } else { n }));
            match name.and_then(|name| params.get(name)) {
                Some(value) => urlencoding::encode(value).into_owned(),
                None => segment.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Parses `base_url` and checks that it is an `http` or `https` URL.
///
/// # Errors
///
/// Returns [`DomainError::InvalidUrl`] when the URL cannot be parsed or
/// carries a fragment, and [`DomainError::UnsupportedScheme`] for any other
/// scheme.
pub fn validate_base_url(base_url: &str) -> DomainResult<Url> {
    let url = Url::parse(base_url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {base_url}")))?;
    if url.fragment().is_some() {
        return Err(DomainError::InvalidUrl(format!("fragment not allowed: {base_url}")));
    }
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(DomainError::UnsupportedScheme {
            scheme: scheme.to_string(),
            url: base_url.to_string(),
        }),
    }
}

/// Appends a normalized path to a base URL without doubling separators.
///
/// A query string on the base URL stays at the end.
#[must_use]
pub fn join_url(base_url: &str, path: Option<&str>) -> String {
    let (base, query) = base_url
        .find('?')
        .map_or((base_url, ""), |at| base_url.split_at(at));
    let base = base.trim_end_matches(SEPARATOR);
    match path {
        Some(path) => format!("{base}/{}{query}", path.trim_start_matches(SEPARATOR)),
        None => format!("{base}{query}"),
    }
}
