use clap::Parser;
use contact_mailer::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::CreateKey(args) => cli::keys::run(args).await,
        Command::AdminToken(args) => cli::token::run(args),
    }
}
