//! CLI for the nutrition guidance agent
//!
//! Two subcommands:
//! - `ask`: answer a single query and exit
//! - `chat`: interactive session on stdin

pub mod ask;
pub mod chat;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::{
    ChromaRetriever, HttpClient, LlamaGuardClassifier, OpenAiEmbeddings, OpenAiProvider,
};
use crate::workflow::RefinementController;

/// Retrieval-augmented guidance agent for nutrition disorders
#[derive(Parser)]
#[command(name = "nutrition-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a single query and exit
    Ask(ask::AskArgs),

    /// Start an interactive chat session
    Chat(chat::ChatArgs),
}

pub(crate) type Provider = OpenAiProvider<HttpClient>;
pub(crate) type Classifier = LlamaGuardClassifier<HttpClient>;
pub(crate) type Store = ChromaRetriever<HttpClient, OpenAiEmbeddings<HttpClient>>;

pub(crate) fn build_provider(config: &AppConfig) -> Provider {
    OpenAiProvider::with_base_url(
        HttpClient::new(),
        &config.openai.api_key,
        &config.openai.base_url,
    )
}

pub(crate) fn build_retriever(config: &AppConfig) -> Store {
    let embeddings = OpenAiEmbeddings::with_base_url(
        HttpClient::new(),
        &config.openai.api_key,
        &config.openai.base_url,
    )
    .with_model(&config.openai.embedding_model);

    ChromaRetriever::new(
        HttpClient::new(),
        Arc::new(embeddings),
        &config.chroma.base_url,
        &config.chroma.collection,
    )
}

pub(crate) fn build_classifier(config: &AppConfig) -> Classifier {
    LlamaGuardClassifier::with_base_url(
        HttpClient::new(),
        &config.guardrail.api_key,
        &config.guardrail.base_url,
    )
    .with_model(&config.guardrail.model)
}

pub(crate) fn build_controller(
    config: &AppConfig,
    llm: Arc<Provider>,
) -> RefinementController<Provider, Store> {
    RefinementController::new(llm, Arc::new(build_retriever(config)), config.workflow.clone())
}
