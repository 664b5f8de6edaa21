//! The iterative refinement workflow
//!
//! Expand the query, retrieve supporting passages, draft a response, then
//! evaluate it for groundedness and precision, refining response or query
//! through two bounded retry cycles until both gates pass or the iteration
//! budget runs out.

mod controller;
pub mod prompts;
mod state;

use serde::{Deserialize, Serialize};

pub use controller::{
    RefinementController, SCORE_THRESHOLD, Stage, groundedness_decision, precision_decision,
};
pub use state::WorkflowState;

/// Fallback returned when a retry budget is exhausted. A designed
/// degradation, not an error.
pub const FALLBACK_RESPONSE: &str =
    "I'm unable to refine the response further. Please provide more context or clarify your question.";

/// Tunables for one controller instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Shared retry ceiling for both quality loops; must be at least 1
    pub loop_max_iter: u32,
    /// Passages requested per retrieval
    pub top_k: usize,
    /// Model used for expansion, generation and refinement
    pub chat_model: String,
    /// Model used for rubric scoring
    pub scoring_model: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            loop_max_iter: 3,
            top_k: 5,
            chat_model: "gpt-4o-mini".to_string(),
            scoring_model: "gpt-4o-mini".to_string(),
        }
    }
}
