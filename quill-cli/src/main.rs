//! quill CLI - run and administer a quill blog
//!
//! - `serve`: HTTP server (pages + JSON API)
//! - `migrate`: create tables and indexes
//! - `user`: grant or revoke admin rights
//! - `routes`: print the route table
//! - `config`: manage `~/.quill/config.toml`

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "quill",
    author,
    version,
    about = "A small blog engine: posts, threaded comments and signed-cookie sessions",
    long_about = "Serve a blog backed by PostgreSQL. Pages are rendered on the server and \
                  the same data is available as a JSON API under /api."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (needs the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Create database tables and indexes
    Migrate(commands::migrate::MigrateArgs),
    /// Manage users (promote, demote)
    User(commands::user::UserArgs),
    /// Print the route table
    Routes(commands::routes::RoutesArgs),
    /// Manage quill configuration (init, path, show)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Load `.env` from the working directory, then `~/.quill/.env`.
/// Variables already set win.
fn load_env_files() {
    dotenvy::dotenv().ok();
    if let Some(home) = dirs::home_dir() {
        dotenvy::from_path(home.join(".quill").join(".env")).ok();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_files();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
        Commands::User(args) => commands::run_user(args).await,
        Commands::Routes(args) => commands::run_routes(args),
        Commands::Config(args) => config::run_config(args),
        Commands::Completions(args) => run_completions(args),
    };

    tracing_setup::shutdown_otel();
    result
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
