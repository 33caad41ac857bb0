//! Browser identity presented to upstream media hosts.
//!
//! Inbound headers are never forwarded. Every outbound request carries the
//! same desktop-browser header set, plus a `Cookie` when the caller supplies
//! one through [`CUSTOM_COOKIE_HEADER`].

use axum::http::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER, USER_AGENT,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Inbound header whose value becomes the outbound `Cookie`.
pub const CUSTOM_COOKIE_HEADER: &str = "x-custom-cookie";

/// Fixed header table sent to every target.
pub const BROWSER_IDENTITY: [(HeaderName, &str); 6] = [
    (
        USER_AGENT,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    ),
    (ACCEPT, "*/*"),
    (ACCEPT_LANGUAGE, "en-US,en;q=0.9,zh-CN;q=0.9"),
    (ACCEPT_ENCODING, "gzip, deflate, br"),
    (REFERER, "https://twitter.com/"),
    (ORIGIN, "https://twitter.com"),
];

/// Build the outbound header set for a relayed request.
///
/// An empty `X-Custom-Cookie` is treated as absent.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(BROWSER_IDENTITY.len() + 1);
    for (name, value) in BROWSER_IDENTITY {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if let Some(cookie) = custom_cookie(inbound) {
        headers.insert(COOKIE, cookie);
    }

    headers
}

/// Repeated `X-Custom-Cookie` headers are joined with `", "`.
fn custom_cookie(inbound: &HeaderMap) -> Option<HeaderValue> {
    let values: Vec<&[u8]> = inbound
        .get_all(CUSTOM_COOKIE_HEADER)
        .iter()
        .map(HeaderValue::as_bytes)
        .collect();
    let joined = values.join(b", ".as_slice());
    if joined.is_empty() {
        return None;
    }
    HeaderValue::from_bytes(&joined).ok()
}
