//! Admin-token command - signs a token for the admin API

use clap::Args;

use crate::config::DEFAULT_JWT_SECRET;
use crate::infrastructure::auth::{JwtConfig, JwtService};

/// Arguments for the admin-token command
#[derive(Args, Clone, Debug)]
pub struct AdminTokenArgs {
    /// Operator name recorded in the token
    #[arg(long)]
    pub subject: String,

    /// Lifetime in hours (defaults to auth.token_hours)
    #[arg(long)]
    pub hours: Option<u64>,
}

pub fn run(args: AdminTokenArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        eprintln!("warning: signing with the default secret; set auth.jwt_secret");
    }

    let service = JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_hours,
    ));
    let hours = args.hours.unwrap_or(config.auth.token_hours);

    println!("{}", service.issue_for_hours(&args.subject, true, hours)?);

    Ok(())
}
