//! Ask command - answer one query and exit

use std::sync::Arc;

use clap::Args;
use tracing::info;

use super::{build_classifier, build_controller, build_provider};
use crate::agent::NutritionAgent;
use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::memory::{HttpMemoryStore, InMemoryMemoryStore};
use crate::infrastructure::HttpClient;

#[derive(Args)]
pub struct AskArgs {
    /// The question to answer
    pub query: String,

    /// User identifier for memory recall
    #[arg(long, default_value = "cli-user")]
    pub user: String,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    let answer = ask_once(&config, &args.user, &args.query).await?;
    println!("{}", answer);

    Ok(())
}

async fn ask_once(config: &AppConfig, user: &str, query: &str) -> anyhow::Result<String> {
    let llm = Arc::new(build_provider(config));
    let controller = build_controller(config, llm.clone());
    let guardrail = Arc::new(build_classifier(config));

    info!(user, "answering one-shot query");

    // hosted memory only when credentials are configured
    if config.memory.api_key.is_empty() {
        let agent = NutritionAgent::new(
            llm,
            controller,
            Arc::new(InMemoryMemoryStore::new()),
            guardrail,
        );
        Ok(agent.handle_query(user, query).await?)
    } else {
        let memory = HttpMemoryStore::with_base_url(
            HttpClient::new(),
            &config.memory.api_key,
            &config.memory.base_url,
        );
        let agent = NutritionAgent::new(llm, controller, Arc::new(memory), guardrail);
        Ok(agent.handle_query(user, query).await?)
    }
}
