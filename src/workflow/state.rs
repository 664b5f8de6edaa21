use serde::{Deserialize, Serialize};

use crate::domain::Passage;

/// The mutable record threaded through every workflow stage.
///
/// One instance is created per incoming query and owned exclusively by one
/// controller run; nothing is shared across concurrent invocations. Loop
/// counters only ever grow, and `query` / `loop_max_iter` never change after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Original user query; immutable after creation
    pub query: String,
    /// Retrieval-friendly expansion of the query
    pub expanded_query: String,
    /// Passages retrieved for the current expanded query
    pub context: Vec<Passage>,
    /// Current generated response (or the max-iterations fallback)
    pub response: String,
    /// Groundedness score from the last evaluation, 1-5
    pub groundedness_score: Option<f32>,
    /// Precision score from the last evaluation, 1-5
    pub precision_score: Option<f32>,
    /// Times the groundedness evaluator has run; never decremented
    pub groundedness_loop_count: u32,
    /// Times the precision evaluator has run; never decremented
    pub precision_loop_count: u32,
    /// Response-refinement guidance (previous response + critique)
    pub feedback: String,
    /// Query-refinement guidance (previous expansion + suggestions)
    pub query_feedback: String,
    /// Shared ceiling for both retry loops; immutable
    pub loop_max_iter: u32,
}

impl WorkflowState {
    /// Create the initial state for one invocation
    pub fn new(query: impl Into<String>, loop_max_iter: u32) -> Self {
        Self {
            query: query.into(),
            expanded_query: String::new(),
            context: Vec::new(),
            response: String::new(),
            groundedness_score: None,
            precision_score: None,
            groundedness_loop_count: 0,
            precision_loop_count: 0,
            feedback: String::new(),
            query_feedback: String::new(),
            loop_max_iter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = WorkflowState::new("what causes anemia", 3);

        assert_eq!(state.query, "what causes anemia");
        assert_eq!(state.loop_max_iter, 3);
        assert!(state.expanded_query.is_empty());
        assert!(state.context.is_empty());
        assert!(state.response.is_empty());
        assert!(state.groundedness_score.is_none());
        assert!(state.precision_score.is_none());
        assert_eq!(state.groundedness_loop_count, 0);
        assert_eq!(state.precision_loop_count, 0);
        assert!(state.feedback.is_empty());
        assert!(state.query_feedback.is_empty());
    }
}
