//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, optional timeout)
//!     → server.rs relay_handler (classify: preflight / index / proxy / 404)
//!     → cors.rs | index.rs | relay::forward
//!     → Send to client
//! ```

pub mod cors;
pub mod index;
pub mod server;

pub use server::{build_router, AppState, RelayServer};
