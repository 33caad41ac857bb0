//! Upstream relay subsystem.
//!
//! # Data Flow
//! ```text
//! inbound path "/https://host/media.jpg"
//!     → target.rs (strip leading '/', parse absolute URL)
//!     → identity.rs (fixed browser headers + optional cookie override)
//!     → forward.rs (one outbound call, no redirect following)
//!     → forward.rs (rewrite Location or strip framing headers, add CORS)
//!     → response streamed back to the caller
//! ```
//!
//! Nothing here holds state between requests. The shared `reqwest::Client`
//! only pools connections.

pub mod error;
pub mod forward;
pub mod identity;
pub mod target;

pub use error::RelayError;
pub use forward::{build_client, forward, RelayResponse};
pub use identity::{outbound_headers, CUSTOM_COOKIE_HEADER};
pub use target::{encode_component, proxy_location, relay_url, resolve_target, target_from_path};
