//! URL canonicalization and origin helpers.
//!
//! Every membership test in the crawler (frontier, in-flight, visited,
//! discovered) goes through [`normalize_url`], so two spellings of the same
//! page always collapse to one entry.

use url::Url;

/// Canonicalize a URL for equality comparison.
///
/// Rules, in order:
/// 1. parse as an absolute URL; on failure return the input unchanged
/// 2. drop the fragment
/// 3. lower-case the host
/// 4. strip the trailing slash from the path unless the path is exactly `/`
///
/// The function is pure and idempotent. A run of trailing slashes is
/// stripped as a whole so that a second pass never changes the result.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    parsed.set_fragment(None);

    // The url crate already lower-cases special-scheme hosts while parsing.
    // Opaque hosts (custom schemes) keep their case, so fold them here too.
    if let Some(host) = parsed.host_str() {
        let lowered = host.to_ascii_lowercase();
        if lowered != host && parsed.set_host(Some(&lowered)).is_err() {
            return parsed.to_string();
        }
    }

    let path = parsed.path();
    if path != "/" && path.ends_with('/') {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/".to_string(),
            rest => rest.to_string(),
        };
        parsed.set_path(&trimmed);
    }

    parsed.to_string()
}

/// Check if a URL is an absolute http(s) URL worth rendering
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Serialized origin (`scheme://host[:port]`) of a URL, if it has one
#[must_use]
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Whether `url` shares scheme, host and port with `base_origin`
#[must_use]
pub fn is_same_origin(url: &str, base_origin: &str) -> bool {
    origin_of(url).is_some_and(|origin| origin == base_origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_is_dropped() {
        assert_eq!(
            normalize_url("https://example.com/docs#intro"),
            "https://example.com/docs"
        );
    }

    #[test]
    fn test_host_case_folds() {
        assert_eq!(
            normalize_url("https://EXAMPLE.com/Path"),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_trailing_slash_stripped() {
        assert_eq!(normalize_url("https://example.com/a/"), "https://example.com/a");
        assert_eq!(normalize_url("https://example.com/a//"), "https://example.com/a");
        assert_eq!(normalize_url("https://example.com//"), "https://example.com/");
    }

    #[test]
    fn test_root_path_kept() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
        assert_eq!(normalize_url("https://example.com"), "https://example.com/");
    }

    #[test]
    fn test_query_preserved() {
        assert_eq!(
            normalize_url("https://example.com/search/?q=rust#top"),
            "https://example.com/search?q=rust"
        );
    }

    #[test]
    fn test_unparsable_returned_unchanged() {
        assert_eq!(normalize_url("/relative/path/"), "/relative/path/");
        assert_eq!(normalize_url("not a url"), "not a url");
    }

    #[test]
    fn test_equivalent_spellings_collapse() {
        let variants = [
            "https://Example.com/a",
            "https://example.com/a/",
            "https://example.com/a#frag",
            "https://EXAMPLE.COM/a/#frag",
        ];
        for v in variants {
            assert_eq!(normalize_url(v), "https://example.com/a", "variant {v}");
        }
    }

    #[test]
    fn test_origin_matching() {
        let base = origin_of("https://example.com/start").unwrap();
        assert!(is_same_origin("https://EXAMPLE.com/other", &base));
        assert!(!is_same_origin("http://example.com/other", &base));
        assert!(!is_same_origin("https://example.com:8443/other", &base));
        assert!(!is_same_origin("https://other.com/x", &base));
        assert!(!is_same_origin("mailto:someone@example.com", &base));
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("javascript:void(0)"));
        assert!(!is_valid_url("ftp://example.com/file"));
    }
}
