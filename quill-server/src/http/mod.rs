//! HTTP server layer
//!
//! Axum server with:
//! - A logged route table and typed argument extraction
//! - Cookie sessions and admin-only `/manage/` pages
//! - Server-rendered templates next to a JSON API
//! - CORS (localhost only by default)
//! - Graceful shutdown

pub mod error;
pub mod middleware;
pub mod reply;
pub mod routes;
pub mod server;
pub mod shim;

pub use error::ApiError;
pub use middleware::CurrentUser;
pub use reply::Reply;
pub use server::{build_router, run_server, ServerConfig, ServerError};
pub use shim::{Arguments, Params, RouteInfo, Routes};
