//! Nutrition disorder guidance agent
//!
//! A retrieval-augmented agent that answers nutrition-disorder questions
//! through an iterative refinement workflow:
//! - Query expansion and top-k passage retrieval
//! - Response generation grounded in the retrieved passages
//! - Rubric-scored groundedness and precision gates with bounded retry loops
//! - Content-safety gating, per-user memory recall, and personalization

pub mod agent;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod workflow;

pub use agent::NutritionAgent;
pub use config::AppConfig;
pub use domain::AgentError;
pub use workflow::{FALLBACK_RESPONSE, RefinementController, WorkflowConfig, WorkflowState};
