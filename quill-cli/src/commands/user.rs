//! User administration
//!
//! Commands: promote, demote. There is no admin UI for granting rights, so
//! the first admin has to be made here.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use quill_server::models::User;
use quill_server::orm::FindAll;

#[derive(Parser, Debug)]
pub struct UserArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Grant admin rights to a registered user
    Promote {
        /// Email the user registered with
        email: String,
    },
    /// Revoke admin rights
    Demote {
        /// Email the user registered with
        email: String,
    },
}

pub async fn run_user(args: UserArgs) -> Result<()> {
    let (email, admin) = match args.command {
        UserCommands::Promote { email } => (email, true),
        UserCommands::Demote { email } => (email, false),
    };
    let email = email.trim().to_lowercase();

    let (_, db) = super::connect(args.database_url).await?;
    let users: Vec<User> = db
        .find_all(
            FindAll::new()
                .filter("\"email\"=?", vec![email.as_str().into()])
                .limit(1),
        )
        .await
        .context("Failed to look up user")?;
    let mut user = users
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No user registered with email {}", email))?;

    if user.admin == admin {
        println!("{} already {}", user.email, role(admin));
        return Ok(());
    }

    user.admin = admin;
    db.update(&user).await.context("Failed to update user")?;
    println!("✅ {} is now {}", user.email, role(admin));
    Ok(())
}

fn role(admin: bool) -> &'static str {
    if admin {
        "an admin"
    } else {
        "a regular user"
    }
}
