//! CLI module for Contact Mailer
//!
//! Subcommands:
//! - `serve`: run the HTTP server
//! - `create-key`: issue an API key straight into the configured store
//! - `admin-token`: mint an admin token for the admin API

pub mod keys;
pub mod serve;
pub mod token;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Contact Mailer - contact form delivery with API keys and abuse protection
#[derive(Parser)]
#[command(name = "contact-mailer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Create an API key (PostgreSQL storage only)
    CreateKey(keys::CreateKeyArgs),

    /// Print a signed admin token
    AdminToken(token::AdminTokenArgs),
}

/// Load `.env`, then the layered configuration
pub fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    AppConfig::load().context("failed to load configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_key() {
        let cli = Cli::try_parse_from([
            "contact-mailer",
            "create-key",
            "--name",
            "site",
            "--owner",
            "owner-1",
            "--expires-in-days",
            "30",
        ])
        .unwrap();

        match cli.command {
            Command::CreateKey(args) => {
                assert_eq!(args.name, "site");
                assert_eq!(args.owner, "owner-1");
                assert_eq!(args.expires_in_days, Some(30));
            }
            _ => panic!("expected create-key"),
        }
    }

    #[test]
    fn test_parse_admin_token_defaults() {
        let cli = Cli::try_parse_from(["contact-mailer", "admin-token", "--subject", "ops"]).unwrap();

        match cli.command {
            Command::AdminToken(args) => {
                assert_eq!(args.subject, "ops");
                assert_eq!(args.hours, None);
            }
            _ => panic!("expected admin-token"),
        }
    }

    #[test]
    fn test_create_key_requires_owner() {
        assert!(Cli::try_parse_from(["contact-mailer", "create-key", "--name", "site"]).is_err());
    }
}
