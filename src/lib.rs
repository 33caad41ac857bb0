//! Media relay library.
//!
//! A single-hop HTTP forwarding relay: `GET /https://host/media.jpg` fetches
//! `https://host/media.jpg` with a fixed browser identity and streams the
//! answer back with permissive CORS headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
