//! REST API.
//!
//! Resources are nested under `/api/` and protected by a middleware
//! stack: Auth → Audit → Role guard → Handler. Registration, login and
//! the doctor directory are public.
//!
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, start_api_server_on, ApiServer, ServerError};
pub use types::ApiContext;
