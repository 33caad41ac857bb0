//! Outbound call and response shaping.

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_ENCODING, CONTENT_LENGTH, LOCATION,
    TRANSFER_ENCODING,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::Response;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::RelayConfig;
use crate::relay::identity::outbound_headers;
use crate::relay::target::proxy_location;
use crate::relay::RelayError;

/// Upstream statuses whose `Location` is rewritten back through the relay.
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Headers dropped from non-redirect responses. The body is streamed as-is,
/// so the upstream framing and encoding claims no longer hold.
const STRIPPED: [HeaderName; 3] = [CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING];

/// Per-connection headers owned by the transport on each side.
const HOP_BY_HOP: [&str; 2] = ["connection", "keep-alive"];

/// A relayed response plus what the relay did to it.
pub struct RelayResponse {
    pub response: Response,
    /// The caller-facing `Location` when an upstream redirect was rewritten.
    pub rewritten_location: Option<String>,
}

/// Build the shared outbound client.
///
/// Redirects are never followed here; the caller gets them rewritten instead.
/// No transparent decompression is enabled, so bodies pass through byte for byte.
pub fn build_client(config: &RelayConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().redirect(Policy::none());

    if !config.upstream.use_system_proxy {
        builder = builder.no_proxy();
    }
    if let Some(timeout) = config.timeouts.connect() {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = config.timeouts.upstream() {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Relay one request to `target` and shape the upstream response for the caller.
///
/// The inbound body is never forwarded; only `X-Custom-Cookie` is read from
/// the inbound headers.
pub async fn forward(
    client: &reqwest::Client,
    method: Method,
    target: Url,
    inbound: &HeaderMap,
) -> Result<RelayResponse, RelayError> {
    let upstream = client
        .request(method, target)
        .headers(outbound_headers(inbound))
        .send()
        .await?;

    let status = upstream.status();

    let location = if is_redirect(status) {
        upstream
            .headers()
            .get(LOCATION)
            .filter(|value| !value.is_empty())
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    } else {
        None
    };

    let (headers, rewritten_location) = match location {
        Some(location) => {
            let rewritten = proxy_location(&location);
            (redirect_headers(upstream.headers(), &rewritten)?, Some(rewritten))
        }
        None => (passthrough_headers(upstream.headers()), None),
    };

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;

    Ok(RelayResponse {
        response,
        rewritten_location,
    })
}

pub fn is_redirect(status: StatusCode) -> bool {
    REDIRECT_STATUSES.contains(&status.as_u16())
}

/// Headers for a rewritten redirect: everything upstream sent, with
/// `Location` pointing back into the relay.
pub fn redirect_headers(upstream: &HeaderMap, location: &str) -> Result<HeaderMap, RelayError> {
    let mut headers = without_hop_by_hop(upstream, |_| true);
    headers.insert(
        LOCATION,
        HeaderValue::from_str(location).map_err(axum::http::Error::from)?,
    );
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    Ok(headers)
}

/// Headers for any other response: upstream headers minus encoding and
/// framing, plus CORS.
pub fn passthrough_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = without_hop_by_hop(upstream, |name| !STRIPPED.contains(name));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
}

fn without_hop_by_hop(upstream: &HeaderMap, keep: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len() + 1);
    for (name, value) in upstream {
        if HOP_BY_HOP.contains(&name.as_str()) || !keep(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONNECTION;

    fn upstream_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("image/jpeg"));
        headers.insert("Content-Length", HeaderValue::from_static("1234"));
        headers.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        headers.insert("Transfer-Encoding", HeaderValue::from_static("chunked"));
        headers.insert("Connection", HeaderValue::from_static("keep-alive"));
        headers.insert("Keep-Alive", HeaderValue::from_static("timeout=5"));
        headers.append("Set-Cookie", HeaderValue::from_static("a=1"));
        headers.append("Set-Cookie", HeaderValue::from_static("b=2"));
        headers
    }

    #[test]
    fn redirect_statuses() {
        for code in [301, 302, 303, 307, 308] {
            assert!(is_redirect(StatusCode::from_u16(code).unwrap()));
        }
        for code in [200, 204, 300, 304, 404, 500] {
            assert!(!is_redirect(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn passthrough_strips_framing_and_adds_cors() {
        let headers = passthrough_headers(&upstream_headers());

        assert!(headers.get(CONTENT_LENGTH).is_none());
        assert!(headers.get(CONTENT_ENCODING).is_none());
        assert!(headers.get(TRANSFER_ENCODING).is_none());
        assert!(headers.get(CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert_eq!(headers["content-type"], "image/jpeg");
        assert_eq!(headers.get_all("set-cookie").iter().count(), 2);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn redirect_keeps_upstream_headers_and_rewrites_location() {
        let mut upstream = upstream_headers();
        upstream.insert(LOCATION, HeaderValue::from_static("https://cdn.example.com/v.mp4"));

        let headers = redirect_headers(
            &upstream,
            &proxy_location("https://cdn.example.com/v.mp4"),
        )
        .unwrap();

        assert_eq!(headers[LOCATION], "/https%3A%2F%2Fcdn.example.com%2Fv.mp4");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[CONTENT_LENGTH], "1234");
        assert_eq!(headers[CONTENT_ENCODING], "gzip");
        assert!(headers.get(CONNECTION).is_none());
    }

    #[test]
    fn client_builds_with_and_without_timeouts() {
        let mut config = RelayConfig::default();
        assert!(build_client(&config).is_ok());

        config.timeouts.connect_secs = Some(2);
        config.timeouts.upstream_secs = Some(10);
        config.upstream.use_system_proxy = true;
        assert!(build_client(&config).is_ok());
    }
}
