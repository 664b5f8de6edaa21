use clap::Parser;
use nutrition_agent::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ask(args) => cli::ask::run(args).await,
        Command::Chat(args) => cli::chat::run(args).await,
    }
}
