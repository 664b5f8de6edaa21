//! Surrounding agent layer
//!
//! Wraps one refinement-workflow invocation with the pieces the core does
//! not own: the content-safety gate, recall of relevant prior interactions,
//! personalization of the final answer, and persistence of the completed
//! turn. The workflow core is only ever invoked after the gate passes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::{
    AgentError, ConversationTurn, LlmProvider, LlmRequest, MemoryStore, PriorInteraction,
    Retriever, SafetyClassifier, SafetyVerdict,
};
use crate::workflow::RefinementController;
use crate::workflow::prompts::StagePrompt;

/// Reply returned for input the safety gate blocks. A normal result, not an
/// error.
pub const BLOCKED_INPUT_RESPONSE: &str =
    "I apologize, but I cannot process that input as it may be inappropriate. Please try again.";

/// Personalization prompt folding prior interactions into the final answer
const AGENT: StagePrompt = StagePrompt {
    system: "\
You are a caring and knowledgeable Medical Support Agent, specializing in \
nutrition disorder-related guidance. Your goal is to provide accurate, \
empathetic, and tailored nutritional recommendations while ensuring a \
seamless customer experience.

Guidelines for Interaction:
1. Maintain a polite, professional, and reassuring tone.
2. Show genuine empathy for customer concerns and health challenges.
3. Reference past interactions to provide personalized and consistent advice.
4. Ensure consistent and accurate information across conversations.
5. If any detail is unclear or missing, proactively ask for clarification.
6. Ground your answer in the retrieved guidance provided below; do not contradict it.

Your primary goal is to help customers make informed nutrition decisions that \
align with their health conditions and personal preferences.",
    user: "Context:\n${var:context}\n\nCurrent customer query: ${var:query}\n\n\
Retrieved guidance:\n${var:guidance}\n\n\
Provide a helpful response that takes into account any relevant past interactions.",
};

/// Conversational agent for nutrition-disorder guidance
#[derive(Debug)]
pub struct NutritionAgent<P, R, M, S>
where
    P: LlmProvider,
    R: Retriever,
    M: MemoryStore,
    S: SafetyClassifier,
{
    llm: Arc<P>,
    controller: RefinementController<P, R>,
    memory: Arc<M>,
    guardrail: Arc<S>,
    chat_model: String,
    memory_limit: usize,
}

impl<P, R, M, S> NutritionAgent<P, R, M, S>
where
    P: LlmProvider,
    R: Retriever,
    M: MemoryStore,
    S: SafetyClassifier,
{
    pub fn new(
        llm: Arc<P>,
        controller: RefinementController<P, R>,
        memory: Arc<M>,
        guardrail: Arc<S>,
    ) -> Self {
        let chat_model = controller.config().chat_model.clone();
        Self {
            llm,
            controller,
            memory,
            guardrail,
            chat_model,
            memory_limit: 5,
        }
    }

    /// Limit on recalled prior interactions (default 5)
    pub fn with_memory_limit(mut self, limit: usize) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Process one customer query end to end.
    ///
    /// Blocked input and the workflow's max-iterations fallback both come
    /// back as ordinary responses; only capability failures are errors.
    pub async fn handle_query(&self, user_id: &str, query: &str) -> Result<String, AgentError> {
        let raw_verdict = self.guardrail.classify(query).await?;

        if let SafetyVerdict::Block(verdict) = SafetyVerdict::from_token(&raw_verdict) {
            warn!(user_id, verdict = %verdict, "query blocked by safety gate");
            return Ok(BLOCKED_INPUT_RESPONSE.to_string());
        }

        let history = self
            .memory
            .search(user_id, query, self.memory_limit)
            .await?;
        debug!(user_id, recalled = history.len(), "prior interactions recalled");

        let state = self.controller.run(query).await?;

        let response = if history.is_empty() {
            state.response
        } else {
            self.personalize(query, &history, &state.response).await?
        };

        self.store_interaction(user_id, query, &response).await?;

        info!(user_id, "query handled");
        Ok(response)
    }

    /// Rephrase the workflow's answer in light of prior interactions
    async fn personalize(
        &self,
        query: &str,
        history: &[PriorInteraction],
        guidance: &str,
    ) -> Result<String, AgentError> {
        let mut context = String::from("Previous relevant interactions:\n");
        for interaction in history {
            context.push_str(&interaction.memory);
            context.push_str("\n---\n");
        }

        let user = AGENT.render_user(&[
            ("context", context.as_str()),
            ("query", query),
            ("guidance", guidance),
        ])?;

        let request = LlmRequest::builder().system(AGENT.system).user(user).build();
        let response = self.llm.chat(&self.chat_model, request).await?;

        Ok(response.content().to_string())
    }

    /// Persist the completed turn for future recall
    async fn store_interaction(
        &self,
        user_id: &str,
        query: &str,
        response: &str,
    ) -> Result<(), AgentError> {
        let turns = [
            ConversationTurn::user(query),
            ConversationTurn::assistant(response),
        ];

        let mut metadata: HashMap<String, serde_json::Value> = HashMap::new();
        metadata.insert(
            "timestamp".to_string(),
            serde_json::json!(Utc::now().to_rfc3339()),
        );
        metadata.insert("type".to_string(), serde_json::json!("support_query"));

        self.memory.add(user_id, &turns, metadata).await
    }
}
