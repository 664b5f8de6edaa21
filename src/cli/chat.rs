//! Chat command - interactive session on stdin

use std::sync::Arc;

use clap::Args;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use super::{build_classifier, build_controller, build_provider};
use crate::agent::NutritionAgent;
use crate::config::AppConfig;
use crate::domain::{LlmProvider, MemoryStore, Retriever, SafetyClassifier};
use crate::infrastructure::HttpClient;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::memory::{HttpMemoryStore, InMemoryMemoryStore};

#[derive(Args)]
pub struct ChatArgs {
    /// User identifier for memory recall
    #[arg(long, default_value = "cli-user")]
    pub user: String,
}

pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    let llm = Arc::new(build_provider(&config));
    let controller = build_controller(&config, llm.clone());
    let guardrail = Arc::new(build_classifier(&config));

    if config.memory.api_key.is_empty() {
        let agent = NutritionAgent::new(
            llm,
            controller,
            Arc::new(InMemoryMemoryStore::new()),
            guardrail,
        );
        repl(agent, &args.user).await
    } else {
        let memory = HttpMemoryStore::with_base_url(
            HttpClient::new(),
            &config.memory.api_key,
            &config.memory.base_url,
        );
        let agent = NutritionAgent::new(llm, controller, Arc::new(memory), guardrail);
        repl(agent, &args.user).await
    }
}

async fn repl<P, R, M, S>(agent: NutritionAgent<P, R, M, S>, user: &str) -> anyhow::Result<()>
where
    P: LlmProvider,
    R: Retriever,
    M: MemoryStore,
    S: SafetyClassifier,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Nutrition guidance agent. Type 'exit' to quit.");
    info!(user, "chat session started");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();

        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        match agent.handle_query(user, query).await {
            Ok(answer) => println!("{}\n", answer),
            Err(e) => eprintln!("error: {}\n", e),
        }
    }

    info!(user, "chat session ended");
    Ok(())
}
