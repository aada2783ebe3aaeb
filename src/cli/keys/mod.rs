//! Create-key command - issues an API key directly into the key store

use anyhow::bail;
use clap::Args;

use crate::config::StorageBackend;
use crate::domain::OwnerId;
use crate::infrastructure::logging;

/// Arguments for the create-key command
#[derive(Args, Clone, Debug)]
pub struct CreateKeyArgs {
    /// Human-readable key name
    #[arg(long)]
    pub name: String,

    /// Owner the key belongs to
    #[arg(long)]
    pub owner: String,

    /// Days until the key expires (1-3650); never expires when omitted
    #[arg(long)]
    pub expires_in_days: Option<u32>,
}

/// Create the key and print the secret once
pub async fn run(args: CreateKeyArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    logging::init_logging(&config.logging);

    if config.storage.backend != StorageBackend::Postgres {
        bail!("create-key needs persistent storage; set storage.backend = \"postgres\"");
    }

    let owner = OwnerId::new(args.owner)?;
    let repository = crate::create_api_key_repository(&config.storage).await?;
    let service = crate::create_api_key_service(repository, &config.api_keys);

    let created = service.create(args.name, owner, args.expires_in_days).await?;

    println!("id:      {}", created.id());
    println!("api key: {}", created.secret);
    if let Some(expires_at) = created.api_key.expires_at() {
        println!("expires: {}", expires_at.to_rfc3339());
    }
    println!("Store this key now; it cannot be shown again.");

    Ok(())
}
