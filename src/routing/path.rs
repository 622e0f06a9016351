//! Path matching helpers shared by the route table and the policy.

use crate::error::PolicyError;

/// Strip a trailing slash so `/dashboard/` and `/dashboard` compare equal.
/// The root path stays `/`.
pub fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Whether `path` is `base` itself or nested beneath it.
///
/// Matching is per segment: `/documents` covers `/documents/upload` but not
/// `/documents-old`. The root `/` only covers itself, otherwise every path
/// in the portal would fall under it.
pub fn is_within(path: &str, base: &str) -> bool {
    let path = normalize(path);
    let base = normalize(base);

    if base == "/" {
        return path == "/";
    }

    path == base
        || path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Check that a configured route is an absolute path without query or fragment.
pub fn validate(path: &str) -> Result<(), PolicyError> {
    let invalid = |reason: &str| PolicyError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if path.contains(['?', '#']) {
        return Err(invalid("must not contain a query or fragment"));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    Ok(())
}
