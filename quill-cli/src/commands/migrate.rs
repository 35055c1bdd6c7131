//! Schema creation command

use anyhow::{Context, Result};
use clap::Parser;

use quill_server::db::migrations;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Print the SQL instead of running it
    #[arg(long)]
    pub print: bool,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    if args.print {
        for statement in migrations::statements() {
            println!("{};", statement);
        }
        return Ok(());
    }

    let (_, db) = super::connect(args.database_url).await?;
    migrations::run(db.pool())
        .await
        .context("Failed to run migrations")?;

    println!("✅ Schema is up to date");
    Ok(())
}
