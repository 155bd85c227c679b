//! HTTP surface.
//!
//! A browser page at `/` drives three JSON/multipart endpoints under
//! `/api/`. The router is composable; `app_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod form;
pub mod router;
pub mod server;
pub mod types;

pub use router::app_router;
pub use server::{start_server, ServerError, ServerHandle};
pub use types::AppState;
