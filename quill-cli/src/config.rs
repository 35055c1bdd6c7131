//! `quill config` - manage ~/.quill/config.toml

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rand::distributions::Alphanumeric;
use rand::Rng;

use quill_server::QuillConfig;

/// Length of generated session secrets
const SECRET_LEN: usize = 48;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter config with a fresh session secret
    Init(InitArgs),
    /// Show config file path
    Path,
    /// Print the effective config (file plus environment)
    Show,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
    }
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect()
}

fn write_starter(config_path: &Path) -> Result<()> {
    let mut config = QuillConfig::default();
    config.session.secret = generate_secret();

    let content = config
        .to_toml()
        .context("Failed to serialize config to TOML")?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
    Ok(())
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = QuillConfig::config_path();

    if config_path.exists() && !args.force {
        return Err(anyhow!(
            "Config already exists at {}\n\nUse --force to overwrite",
            config_path.display()
        ));
    }

    write_starter(&config_path)?;

    println!("✅ Created config at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit the config: $EDITOR {}", config_path.display());
    println!("  2. Point [database] url at your PostgreSQL database");
    println!("  3. Run: quill migrate");
    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", QuillConfig::config_path().display());
    Ok(())
}

fn run_show() -> Result<()> {
    let mut config = QuillConfig::load()?;
    if !config.uses_dev_secret() {
        config.session.secret = "<set>".to_string();
    }

    let toml_str = config
        .to_toml()
        .context("Failed to serialize config to TOML")?;
    println!("{}", toml_str);
    Ok(())
}
