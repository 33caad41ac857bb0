//! Documentation page served at `/`.

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

pub const INDEX_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Twitter/X Proxy Worker</title>
  <style>
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }
    h1 { color: #1DA1F2; }
    .box { border: 1px solid #e1e8ed; padding: 20px; border-radius: 12px; margin: 20px 0; background: #f7f9f9; }
    code { background: #e8f5fe; padding: 4px 8px; border-radius: 4px; font-family: monospace; }
    .step { margin: 15px 0; padding-left: 20px; }
  </style>
</head>
<body>
  <h1>🐦 Twitter/X Proxy Worker</h1>

  <div class="box">
    <h3>📖 Usage</h3>
    <p>This relay forwards Twitter/X media requests so download tools such as yt-dlp can reach images and video through it.</p>
    <p>Append the full target URL to the relay address:</p>
    <code>/https://pbs.twimg.com/media/example.jpg</code>
    <p style="margin-top: 10px; color: #666; font-size: 14px;">
      Send an <code>X-Custom-Cookie</code> header to pass a session cookie upstream.
    </p>
  </div>

  <div class="box">
    <h3>🚀 Running</h3>
    <div class="step">1. Build the <strong>media-relay</strong> binary</div>
    <div class="step">2. Optionally write a <strong>relay.toml</strong> (bind address, timeouts, logging)</div>
    <div class="step">3. Start it with <code>media-relay --config relay.toml</code></div>
  </div>

  <div class="box">
    <h3>⚙️ Bot configuration</h3>
    <p>Add to the bot's .env file:</p>
    <code>TWITTER_PROXY_URL=https://your-relay.example.com</code>
    <p style="margin-top: 10px; color: #666; font-size: 14px;">
      Replace <code>your-relay.example.com</code> with the address the relay is reachable at
    </p>
  </div>

  <div class="box">
    <h3>✅ Check</h3>
    <p>Once running, open:</p>
    <code>https://your-relay.example.com/</code>
    <p style="margin-top: 10px; color: #666; font-size: 14px;">
      You should see this page, or run <code>relay-cli status</code>
    </p>
  </div>
</body>
</html>"#;

pub fn index_page() -> Response {
    ([(CONTENT_TYPE, INDEX_CONTENT_TYPE)], INDEX_HTML).into_response()
}
