//! HTTP server command
//!
//! Runs migrations, then serves pages and the JSON API until Ctrl+C/SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use quill_server::db::migrations;
use quill_server::{run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: from config, 127.0.0.1:9000)
    #[arg(long, short = 'b', env = "QUILL_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory to serve under /static/
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Skip creating tables on startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let (config, db) = super::connect(args.database_url).await?;

    if !args.no_migrate {
        migrations::run(db.pool())
            .await
            .context("Failed to run migrations")?;
    }

    if config.uses_dev_secret() {
        tracing::warn!(
            "session cookies are signed with the built-in development secret; \
             set QUILL_SESSION_SECRET or run `quill config init`"
        );
    }

    let server_config = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.server.bind),
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
        static_dir: args.static_dir.or_else(|| config.server.static_dir.clone()),
    };
    tracing::info!("Starting quill server on {}", server_config.bind_addr);

    let state = AppState::new(db, &config);

    // Run server (blocks until shutdown)
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
