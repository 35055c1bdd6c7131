//! quill-server: a small blog engine
//!
//! Users register and sign in with a signed session cookie, admins publish
//! blogs, readers leave threaded comments. Pages are rendered on the server
//! and the same data is exposed as a JSON API. Persistence goes through a
//! small descriptor-driven mapper over PostgreSQL ([`orm`]).

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod orm;
pub mod session;
pub mod state;
pub mod views;

pub use config::QuillConfig;
pub use http::{build_router, run_server, ServerConfig, ServerError};
pub use state::AppState;
