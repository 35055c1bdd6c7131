//! Command implementations for the quill CLI

pub mod migrate;
pub mod routes;
pub mod serve;
pub mod user;

use anyhow::{Context, Result};
use quill_server::db::create_pool_with_options;
use quill_server::orm::Database;
use quill_server::QuillConfig;

// Re-export main dispatcher functions for flat access from main.rs
pub use migrate::run_migrate;
pub use routes::run_routes;
pub use serve::run_serve;
pub use user::run_user;

/// Load config and open the pool, `database_url` taking precedence.
pub(crate) async fn connect(database_url: Option<String>) -> Result<(QuillConfig, Database)> {
    let mut config = QuillConfig::load().context("Failed to load configuration")?;
    if let Some(url) = database_url {
        config.database.url = url;
    }

    let pool = create_pool_with_options(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to create database pool")?;

    Ok((config, Database::new(pool)))
}
