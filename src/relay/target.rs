//! Target URL derivation and relay-path encoding.
//!
//! A first-hop target is pasted raw after the leading `/`:
//! `/https://pbs.twimg.com/media/x.jpg`. Redirect targets come back from the
//! relay wrapped as `'/' + encodeURIComponent(location)`, i.e.
//! `/https%3A%2F%2Fvideo.twimg.com%2Fv.mp4`. Raw targets are never decoded;
//! a target whose scheme separator is itself percent-encoded is decoded once
//! so those wrapped redirects land on the right host.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::relay::RelayError;

/// Path prefix that selects the proxy branch.
pub const PROXY_PREFIX: &str = "/http";

/// Bytes left alone by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Raw target for a proxy-branch path, or `None` if the path is not one.
pub fn target_from_path(path: &str) -> Option<&str> {
    if path.starts_with(PROXY_PREFIX) {
        Some(&path[1..])
    } else {
        None
    }
}

/// Parse a raw target into an absolute URL.
pub fn resolve_target(raw: &str) -> Result<Url, RelayError> {
    let target = if has_encoded_scheme(raw) {
        percent_decode_str(raw).decode_utf8()?
    } else {
        Cow::Borrowed(raw)
    };

    match Url::parse(&target) {
        Ok(url) => Ok(url),
        Err(source) => Err(RelayError::InvalidTarget {
            target: target.into_owned(),
            source,
        }),
    }
}

fn has_encoded_scheme(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http%3a") || lower.starts_with("https%3a")
}

/// Percent-encode a string the way `encodeURIComponent` does.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Relay-relative `Location` for an upstream redirect target.
pub fn proxy_location(location: &str) -> String {
    format!("/{}", encode_component(location))
}

/// Absolute relay URL a client should request to fetch `target`.
pub fn relay_url(base: &str, target: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_paths_strip_one_slash() {
        assert_eq!(
            target_from_path("/https://example.com/image.jpg"),
            Some("https://example.com/image.jpg")
        );
        assert_eq!(
            target_from_path("/http://example.com"),
            Some("http://example.com")
        );
        assert_eq!(target_from_path("/httpbin"), Some("httpbin"));
    }

    #[test]
    fn non_proxy_paths() {
        assert_eq!(target_from_path("/"), None);
        assert_eq!(target_from_path("/favicon.ico"), None);
        assert_eq!(target_from_path("/HTTPS://example.com"), None);
        assert_eq!(target_from_path("//https://example.com"), None);
    }

    #[test]
    fn raw_target_is_not_decoded() {
        let url = resolve_target("https://example.com/a%2Fb?x=%20").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a%2Fb?x=%20");
    }

    #[test]
    fn wrapped_redirect_target_is_decoded_once() {
        let url = resolve_target("https%3A%2F%2Fcdn.example.com%2Fv.mp4%3Ftag%3D12").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/v.mp4?tag=12");

        let url = resolve_target("HTTP%3a%2F%2Fexample.com%2F").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn unparsable_target_is_an_error() {
        let err = resolve_target("httpbin").unwrap_err();
        assert!(matches!(err, RelayError::InvalidTarget { .. }));
        assert!(err.to_string().contains("httpbin"));
    }

    #[test]
    fn location_matches_encode_uri_component() {
        assert_eq!(
            proxy_location("https://cdn.example.com/v.mp4"),
            "/https%3A%2F%2Fcdn.example.com%2Fv.mp4"
        );
        assert_eq!(
            encode_component("a b?c=d&e=(f)!~*'_.-"),
            "a%20b%3Fc%3Dd%26e%3D(f)!~*'_.-"
        );
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn relay_url_joins_base_and_target() {
        assert_eq!(
            relay_url("https://relay.example.dev/", "https://pbs.twimg.com/a.jpg"),
            "https://relay.example.dev/https://pbs.twimg.com/a.jpg"
        );
        assert_eq!(
            relay_url("http://127.0.0.1:8080", "https://x.com"),
            "http://127.0.0.1:8080/https://x.com"
        );
    }
}
