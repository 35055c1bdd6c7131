//! Route table listing

use anyhow::{Context, Result};
use clap::Parser;

use quill_server::http::routes;

#[derive(Parser, Debug)]
pub struct RoutesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_routes(args: RoutesArgs) -> Result<()> {
    let table = routes::table();

    if args.json {
        let json = serde_json::to_string_pretty(table.infos())
            .context("Failed to serialize route table")?;
        println!("{}", json);
        return Ok(());
    }

    for info in table.infos() {
        println!("{:<5} {:<28} {}", info.method, info.path, info.handler);
    }
    Ok(())
}
