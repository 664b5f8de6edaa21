//! Layered application configuration
//!
//! Values come from `config/default`, then `config/local`, then
//! `NUTRITION__`-prefixed environment variables, each layer overriding the
//! previous one. API keys are expected from the environment only.

use serde::Deserialize;

use crate::workflow::WorkflowConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub workflow: WorkflowConfig,
    pub openai: OpenAiConfig,
    pub guardrail: GuardrailConfig,
    pub chroma: ChromaConfig,
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// OpenAI credentials and endpoints, shared by chat and embeddings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
}

/// Groq-hosted Llama-Guard settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardrailConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChromaConfig {
    pub base_url: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// When unset, memory stays in process
    pub api_key: String,
    pub base_url: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
        }
    }
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.groq.com/openai".to_string(),
            model: "meta-llama/llama-guard-4-12b".to_string(),
        }
    }
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            collection: "nutrition_disorders".to_string(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.mem0.ai".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("NUTRITION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
