//! Refinement controller: the cyclic state machine coordinating query
//! expansion, retrieval, generation and the two quality gates.
//!
//! The graph has exactly two cycles. The groundedness retry re-enters
//! generation only (craft-response -> score-groundedness -> refine-response);
//! the precision retry restarts the entire pipeline through refine-query ->
//! expand-query. Each cycle increments a counter that is never reset, so any
//! run terminates once both counters pass the shared ceiling.

use std::sync::Arc;

use tracing::{debug, info};

use super::prompts;
use super::state::WorkflowState;
use super::{FALLBACK_RESPONSE, WorkflowConfig};
use crate::domain::retrieval::join_contents;
use crate::domain::{AgentError, LlmProvider, LlmRequest, Retriever};

/// Quality threshold shared by both gates; inclusive comparison
pub const SCORE_THRESHOLD: f32 = 4.0;

/// Stages of the refinement workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExpandQuery,
    RetrieveContext,
    CraftResponse,
    ScoreGroundedness,
    RefineResponse,
    CheckPrecision,
    RefineQuery,
    MaxIterations,
    End,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ExpandQuery => "expand_query",
            Stage::RetrieveContext => "retrieve_context",
            Stage::CraftResponse => "craft_response",
            Stage::ScoreGroundedness => "score_groundedness",
            Stage::RefineResponse => "refine_response",
            Stage::CheckPrecision => "check_precision",
            Stage::RefineQuery => "refine_query",
            Stage::MaxIterations => "max_iterations",
            Stage::End => "end",
        }
    }
}

/// Decide where to go after a groundedness evaluation.
///
/// The threshold comparison is inclusive (`>=`) while the loop-exit
/// comparison is strict (`>`), so the cycle may run `loop_max_iter + 1`
/// times before being forced to stop. Both comparisons are deliberate and
/// must not be unified.
pub fn groundedness_decision(score: f32, loop_count: u32, loop_max_iter: u32) -> Stage {
    if score >= SCORE_THRESHOLD {
        Stage::CheckPrecision
    } else if loop_count > loop_max_iter {
        Stage::MaxIterations
    } else {
        Stage::RefineResponse
    }
}

/// Decide where to go after a precision evaluation. Same tie-break policy as
/// [`groundedness_decision`].
pub fn precision_decision(score: f32, loop_count: u32, loop_max_iter: u32) -> Stage {
    if score >= SCORE_THRESHOLD {
        Stage::End
    } else if loop_count > loop_max_iter {
        Stage::MaxIterations
    } else {
        Stage::RefineQuery
    }
}

/// Parse an evaluator reply as a score on the 1-5 scale.
///
/// Anything that is not a number inside the scale aborts the invocation; the
/// workflow never clamps or defaults a score.
fn parse_rubric_score(metric: &str, raw: &str) -> Result<f32, AgentError> {
    let score: f32 = raw
        .trim()
        .parse()
        .map_err(|_| AgentError::score_parse(metric, raw))?;

    if !(1.0..=5.0).contains(&score) {
        return Err(AgentError::score_parse(metric, raw));
    }

    Ok(score)
}

/// Drives one query through the refinement workflow.
///
/// Capabilities are injected at construction; the controller holds no global
/// state and each `run` owns its `WorkflowState` exclusively, so concurrent
/// runs are independent.
#[derive(Debug)]
pub struct RefinementController<P, R>
where
    P: LlmProvider,
    R: Retriever,
{
    llm: Arc<P>,
    scorer: Arc<P>,
    retriever: Arc<R>,
    config: WorkflowConfig,
}

impl<P, R> RefinementController<P, R>
where
    P: LlmProvider,
    R: Retriever,
{
    /// Create a controller; the generation provider also scores by default
    pub fn new(llm: Arc<P>, retriever: Arc<R>, config: WorkflowConfig) -> Self {
        Self {
            scorer: llm.clone(),
            llm,
            retriever,
            config,
        }
    }

    /// Use a dedicated provider for rubric scoring
    pub fn with_scorer(mut self, scorer: Arc<P>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Run the workflow for one query until a terminal stage is reached.
    ///
    /// Returns the final state: either a converged response or the
    /// max-iterations fallback. Capability failures abort the run.
    pub async fn run(&self, query: impl Into<String>) -> Result<WorkflowState, AgentError> {
        if self.config.loop_max_iter == 0 {
            return Err(AgentError::configuration("loop_max_iter must be at least 1"));
        }

        let mut state = WorkflowState::new(query, self.config.loop_max_iter);
        let mut stage = Stage::ExpandQuery;

        info!(query = %state.query, "starting refinement workflow");

        loop {
            debug!(stage = stage.name(), "entering stage");

            stage = match stage {
                Stage::ExpandQuery => {
                    self.expand_query(&mut state).await?;
                    Stage::RetrieveContext
                }
                Stage::RetrieveContext => {
                    self.retrieve_context(&mut state).await?;
                    Stage::CraftResponse
                }
                Stage::CraftResponse => {
                    self.craft_response(&mut state).await?;
                    Stage::ScoreGroundedness
                }
                Stage::ScoreGroundedness => {
                    let score = self.score_groundedness(&mut state).await?;
                    groundedness_decision(
                        score,
                        state.groundedness_loop_count,
                        state.loop_max_iter,
                    )
                }
                Stage::RefineResponse => {
                    self.refine_response(&mut state).await?;
                    Stage::CraftResponse
                }
                Stage::CheckPrecision => {
                    let score = self.check_precision(&mut state).await?;
                    precision_decision(score, state.precision_loop_count, state.loop_max_iter)
                }
                Stage::RefineQuery => {
                    self.refine_query(&mut state).await?;
                    Stage::ExpandQuery
                }
                Stage::MaxIterations => {
                    self.max_iterations_reached(&mut state);
                    Stage::End
                }
                Stage::End => {
                    info!(
                        groundedness = ?state.groundedness_score,
                        precision = ?state.precision_score,
                        "workflow finished"
                    );
                    return Ok(state);
                }
            };
        }
    }

    /// Expand the user query into a retrieval-friendly form
    async fn expand_query(&self, state: &mut WorkflowState) -> Result<(), AgentError> {
        let user = prompts::EXPANSION.render_user(&[
            ("query", &state.query),
            ("query_feedback", &state.query_feedback),
        ])?;

        let request = LlmRequest::builder()
            .system(prompts::EXPANSION.system)
            .user(user)
            .build();

        let response = self.llm.chat(&self.config.chat_model, request).await?;
        state.expanded_query = response.content().trim().to_string();

        debug!(expanded_query = %state.expanded_query, "query expanded");
        Ok(())
    }

    /// Retrieve the top-k passages for the expanded query. An empty result is
    /// valid; generation proceeds on empty context and the groundedness gate
    /// flags the outcome naturally.
    async fn retrieve_context(&self, state: &mut WorkflowState) -> Result<(), AgentError> {
        state.context = self
            .retriever
            .search(&state.expanded_query, self.config.top_k)
            .await?;

        debug!(passages = state.context.len(), "context retrieved");
        Ok(())
    }

    /// Generate a response from the query and retrieved context.
    ///
    /// `query_feedback` doubles as generation guidance here: the same notes
    /// that steer query expansion also steer response crafting. Only
    /// `response` is mutated, so re-entry after refinement is safe.
    async fn craft_response(&self, state: &mut WorkflowState) -> Result<(), AgentError> {
        let context = join_contents(&state.context);
        let user = prompts::GENERATE.render_user(&[
            ("query", &state.query),
            ("context", &context),
            ("feedback", &state.query_feedback),
        ])?;

        let request = LlmRequest::builder()
            .system(prompts::GENERATE.system)
            .user(user)
            .build();

        let response = self.llm.chat(&self.config.chat_model, request).await?;
        state.response = response.content().to_string();

        Ok(())
    }

    /// Score how well the response is supported by the retrieved context
    async fn score_groundedness(&self, state: &mut WorkflowState) -> Result<f32, AgentError> {
        let context = join_contents(&state.context);
        let user = prompts::GROUNDEDNESS.render_user(&[
            ("context", &context),
            ("response", &state.response),
        ])?;

        let request = LlmRequest::builder()
            .system(prompts::GROUNDEDNESS.system)
            .user(user)
            .build();

        let response = self.scorer.chat(&self.config.scoring_model, request).await?;
        let score = parse_rubric_score("groundedness", response.content())?;

        state.groundedness_score = Some(score);
        state.groundedness_loop_count += 1;

        info!(
            score,
            loop_count = state.groundedness_loop_count,
            "groundedness evaluated"
        );
        Ok(score)
    }

    /// Critique the response; the critique and the previous response both
    /// feed the next generation pass
    async fn refine_response(&self, state: &mut WorkflowState) -> Result<(), AgentError> {
        let user = prompts::RESPONSE_REFINEMENT.render_user(&[
            ("query", &state.query),
            ("response", &state.response),
        ])?;

        let request = LlmRequest::builder()
            .system(prompts::RESPONSE_REFINEMENT.system)
            .user(user)
            .build();

        let response = self.llm.chat(&self.config.chat_model, request).await?;
        state.feedback = format!(
            "Previous Response: {}\nSuggestions: {}",
            state.response,
            response.content()
        );

        debug!("response critique recorded");
        Ok(())
    }

    /// Score how precisely the response addresses the original query
    async fn check_precision(&self, state: &mut WorkflowState) -> Result<f32, AgentError> {
        let user = prompts::PRECISION.render_user(&[
            ("query", &state.query),
            ("response", &state.response),
        ])?;

        let request = LlmRequest::builder()
            .system(prompts::PRECISION.system)
            .user(user)
            .build();

        let response = self.scorer.chat(&self.config.scoring_model, request).await?;
        let score = parse_rubric_score("precision", response.content())?;

        state.precision_score = Some(score);
        state.precision_loop_count += 1;

        info!(
            score,
            loop_count = state.precision_loop_count,
            "precision evaluated"
        );
        Ok(score)
    }

    /// Suggest query improvements; the suggestions restart the entire
    /// pipeline via expand-query
    async fn refine_query(&self, state: &mut WorkflowState) -> Result<(), AgentError> {
        let user = prompts::QUERY_REFINEMENT.render_user(&[
            ("query", &state.query),
            ("expanded_query", &state.expanded_query),
        ])?;

        let request = LlmRequest::builder()
            .system(prompts::QUERY_REFINEMENT.system)
            .user(user)
            .build();

        let response = self.llm.chat(&self.config.chat_model, request).await?;
        state.query_feedback = format!(
            "Previous Expanded Query: {}\nSuggestions: {}",
            state.expanded_query,
            response.content()
        );

        debug!("query refinement recorded");
        Ok(())
    }

    /// Terminal fallback once a retry budget is exhausted. A designed
    /// degradation returned as a normal result, not an error.
    fn max_iterations_reached(&self, state: &mut WorkflowState) {
        info!(
            groundedness_loops = state.groundedness_loop_count,
            precision_loops = state.precision_loop_count,
            "iteration budget exhausted, returning fallback response"
        );
        state.response = FALLBACK_RESPONSE.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Passage;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::retrieval::mock::MockRetriever;

    fn controller_with(
        llm: MockLlmProvider,
        scorer: MockLlmProvider,
        retriever: MockRetriever,
    ) -> RefinementController<MockLlmProvider, MockRetriever> {
        RefinementController::new(
            Arc::new(llm),
            Arc::new(retriever),
            WorkflowConfig::default(),
        )
        .with_scorer(Arc::new(scorer))
    }

    fn nutrition_passages() -> Vec<Passage> {
        vec![
            Passage::new("Iron-deficiency anemia is treated with dietary iron and vitamin C.")
                .with_source("handbook.pdf"),
            Passage::new("Heme iron from meat is absorbed better than non-heme iron."),
        ]
    }

    // Gate determinism and the inclusive/strict tie-break policy

    #[test]
    fn test_groundedness_gate_inclusive_threshold() {
        assert_eq!(groundedness_decision(4.0, 1, 3), Stage::CheckPrecision);
        assert_eq!(groundedness_decision(4.2, 1, 3), Stage::CheckPrecision);
        assert_eq!(groundedness_decision(5.0, 4, 3), Stage::CheckPrecision);
    }

    #[test]
    fn test_groundedness_gate_strict_loop_exit() {
        // at the ceiling the loop is still allowed one more attempt
        assert_eq!(groundedness_decision(3.9, 3, 3), Stage::RefineResponse);
        assert_eq!(groundedness_decision(3.9, 4, 3), Stage::MaxIterations);
        assert_eq!(groundedness_decision(1.0, 2, 1), Stage::MaxIterations);
    }

    #[test]
    fn test_precision_gate() {
        assert_eq!(precision_decision(4.0, 1, 3), Stage::End);
        assert_eq!(precision_decision(3.9, 3, 3), Stage::RefineQuery);
        assert_eq!(precision_decision(3.9, 4, 3), Stage::MaxIterations);
    }

    #[test]
    fn test_gates_are_pure() {
        for _ in 0..3 {
            assert_eq!(groundedness_decision(2.5, 2, 3), Stage::RefineResponse);
            assert_eq!(precision_decision(2.5, 2, 3), Stage::RefineQuery);
        }
    }

    // Score parsing contract

    #[test]
    fn test_parse_rubric_score() {
        assert_eq!(parse_rubric_score("groundedness", "4").unwrap(), 4.0);
        assert_eq!(parse_rubric_score("groundedness", " 4.5 \n").unwrap(), 4.5);
        assert_eq!(parse_rubric_score("precision", "1.0").unwrap(), 1.0);
        assert_eq!(parse_rubric_score("precision", "5").unwrap(), 5.0);
    }

    #[test]
    fn test_parse_rubric_score_rejects_non_numeric() {
        let err = parse_rubric_score("groundedness", "well grounded").unwrap_err();
        assert!(matches!(err, AgentError::ScoreParse { .. }));
    }

    #[test]
    fn test_parse_rubric_score_rejects_out_of_range() {
        assert!(parse_rubric_score("precision", "0.5").is_err());
        assert!(parse_rubric_score("precision", "7").is_err());
        assert!(parse_rubric_score("precision", "-2").is_err());
    }

    // Scenario A: high groundedness on the first pass skips refine-response

    #[tokio::test]
    async fn test_first_pass_convergence() {
        let llm = MockLlmProvider::new("gen")
            .with_reply("expanded anemia query")
            .with_reply("Iron-rich foods and vitamin C help with anemia.");
        let scorer = MockLlmProvider::new("scorer")
            .with_reply("4.2")
            .with_reply("4.5");
        let retriever = MockRetriever::new().with_results(nutrition_passages());

        let controller = controller_with(llm, scorer, retriever);
        let state = controller.run("what helps with anemia").await.unwrap();

        assert_eq!(state.groundedness_score, Some(4.2));
        assert_eq!(state.precision_score, Some(4.5));
        assert_eq!(state.groundedness_loop_count, 1);
        assert_eq!(state.precision_loop_count, 1);
        assert_eq!(state.response, "Iron-rich foods and vitamin C help with anemia.");
        assert!(state.feedback.is_empty());
        assert!(state.query_feedback.is_empty());
    }

    // Scenario B: persistently low groundedness runs the evaluator exactly
    // loop_max_iter + 1 times before the fallback fires

    #[tokio::test]
    async fn test_groundedness_budget_off_by_one() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("draft");
        let scorer = MockLlmProvider::new("scorer").with_fallback_reply("2.0");
        let retriever = MockRetriever::new().with_results(nutrition_passages());

        let controller = controller_with(llm, scorer, retriever);
        let state = controller.run("what helps with anemia").await.unwrap();

        // initial evaluation plus three retries, then the strict > fires
        assert_eq!(state.groundedness_loop_count, 4);
        assert_eq!(state.precision_loop_count, 0);
        assert_eq!(state.response, FALLBACK_RESPONSE);
        assert_eq!(state.groundedness_score, Some(2.0));
    }

    #[tokio::test]
    async fn test_groundedness_budget_with_custom_ceiling() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("draft");
        let scorer = MockLlmProvider::new("scorer").with_fallback_reply("1.0");
        let retriever = MockRetriever::new();

        let config = WorkflowConfig {
            loop_max_iter: 1,
            ..WorkflowConfig::default()
        };
        let controller = RefinementController::new(
            Arc::new(llm),
            Arc::new(retriever),
            config,
        )
        .with_scorer(Arc::new(scorer));

        let state = controller.run("q").await.unwrap();
        assert_eq!(state.groundedness_loop_count, 2);
        assert_eq!(state.response, FALLBACK_RESPONSE);
    }

    // Scenario C: a boundary precision score of exactly 4.0 passes and the
    // response is returned unchanged

    #[tokio::test]
    async fn test_boundary_precision_passes() {
        let llm = MockLlmProvider::new("gen")
            .with_reply("expanded")
            .with_reply("the crafted answer");
        let scorer = MockLlmProvider::new("scorer")
            .with_reply("5.0")
            .with_reply("4.0");
        let retriever = MockRetriever::new().with_results(nutrition_passages());

        let controller = controller_with(llm, scorer, retriever);
        let state = controller.run("query").await.unwrap();

        assert_eq!(state.precision_score, Some(4.0));
        assert_eq!(state.response, "the crafted answer");
    }

    // Scenario D: empty retrieval is not an error; generation and scoring
    // proceed on empty context

    #[tokio::test]
    async fn test_empty_retrieval_still_generates() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("ungrounded guess");
        let scorer = MockLlmProvider::new("scorer")
            .with_reply("2.0")
            .with_reply("4.5")
            .with_reply("4.2");
        let retriever = MockRetriever::new();

        let controller = controller_with(llm, scorer, retriever);
        let state = controller.run("query").await.unwrap();

        assert!(state.context.is_empty());
        assert_eq!(state.groundedness_loop_count, 2);
        assert_eq!(state.precision_loop_count, 1);
        assert_eq!(state.response, "ungrounded guess");
    }

    // The precision cycle restarts the whole pipeline and both counters
    // survive the restart (monotonicity, termination)

    #[tokio::test]
    async fn test_precision_cycle_reenters_pipeline() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("text");
        // groundedness always passes, precision always fails
        let scorer = MockLlmProvider::new("scorer")
            .with_reply("5.0")
            .with_reply("2.0")
            .with_reply("5.0")
            .with_reply("2.0")
            .with_reply("5.0")
            .with_reply("2.0")
            .with_reply("5.0")
            .with_reply("2.0");
        let retriever = MockRetriever::new().with_results(nutrition_passages());

        let controller = controller_with(llm, scorer, retriever);
        let state = controller.run("query").await.unwrap();

        assert_eq!(state.precision_loop_count, 4);
        assert_eq!(state.groundedness_loop_count, 4);
        assert_eq!(state.response, FALLBACK_RESPONSE);
        // query feedback from the last refine-query pass is retained
        assert!(state.query_feedback.starts_with("Previous Expanded Query:"));
    }

    #[tokio::test]
    async fn test_outer_cycle_re_retrieves() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("text");
        let scorer = MockLlmProvider::new("scorer")
            .with_reply("5.0")
            .with_reply("2.0")
            .with_reply("5.0")
            .with_fallback_reply("4.5");
        let retriever = MockRetriever::new().with_results(nutrition_passages());
        let retriever = Arc::new(retriever);

        let controller = RefinementController::new(
            Arc::new(llm),
            retriever.clone(),
            WorkflowConfig::default(),
        )
        .with_scorer(Arc::new(scorer));

        let state = controller.run("query").await.unwrap();

        // one refine-query round means two full retrieval passes
        assert_eq!(retriever.search_count(), 2);
        assert_eq!(state.precision_loop_count, 2);
        assert_eq!(state.precision_score, Some(4.5));
    }

    // Feedback bookkeeping

    #[tokio::test]
    async fn test_refine_response_keeps_response_history() {
        let llm = MockLlmProvider::new("gen")
            .with_reply("expanded")
            .with_reply("first draft")
            .with_reply("add dosage guidance")
            .with_fallback_reply("second draft");
        let scorer = MockLlmProvider::new("scorer")
            .with_reply("2.0")
            .with_reply("5.0")
            .with_reply("4.5");
        let retriever = MockRetriever::new().with_results(nutrition_passages());

        let controller = controller_with(llm, scorer, retriever);
        let state = controller.run("query").await.unwrap();

        assert_eq!(
            state.feedback,
            "Previous Response: first draft\nSuggestions: add dosage guidance"
        );
        assert_eq!(state.response, "second draft");
    }

    // Idempotence: crafting twice with identical inputs touches only the
    // response field

    #[tokio::test]
    async fn test_craft_response_idempotent() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("same answer");
        let scorer = MockLlmProvider::new("scorer");
        let retriever = MockRetriever::new();

        let controller = controller_with(llm, scorer, retriever);

        let mut state = WorkflowState::new("query", 3);
        state.expanded_query = "expanded".to_string();
        state.context = nutrition_passages();
        state.query_feedback = "focus on diet".to_string();

        controller.craft_response(&mut state).await.unwrap();
        let first = state.clone();
        controller.craft_response(&mut state).await.unwrap();

        assert_eq!(state.response, first.response);
        assert_eq!(state.query, first.query);
        assert_eq!(state.expanded_query, first.expanded_query);
        assert_eq!(state.context.len(), first.context.len());
        assert_eq!(state.groundedness_loop_count, first.groundedness_loop_count);
        assert_eq!(state.feedback, first.feedback);
        assert_eq!(state.query_feedback, first.query_feedback);
    }

    // Error propagation: capability failures abort, malformed scores abort

    #[tokio::test]
    async fn test_generation_failure_aborts() {
        let llm = MockLlmProvider::new("gen").with_failure("connection reset");
        let scorer = MockLlmProvider::new("scorer");
        let retriever = MockRetriever::new();

        let controller = controller_with(llm, scorer, retriever);
        let result = controller.run("query").await;

        assert!(matches!(result, Err(AgentError::Generation { .. })));
    }

    #[tokio::test]
    async fn test_retrieval_failure_aborts() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("expanded");
        let scorer = MockLlmProvider::new("scorer");
        let retriever = MockRetriever::new().with_error("index offline");

        let controller = controller_with(llm, scorer, retriever);
        let result = controller.run("query").await;

        assert!(matches!(result, Err(AgentError::Retrieval { .. })));
    }

    #[tokio::test]
    async fn test_unparseable_score_aborts() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("text");
        let scorer = MockLlmProvider::new("scorer").with_reply("definitely grounded");
        let retriever = MockRetriever::new().with_results(nutrition_passages());

        let controller = controller_with(llm, scorer, retriever);
        let result = controller.run("query").await;

        assert!(matches!(result, Err(AgentError::ScoreParse { .. })));
    }

    #[tokio::test]
    async fn test_out_of_scale_score_aborts() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("text");
        let scorer = MockLlmProvider::new("scorer").with_reply("8");
        let retriever = MockRetriever::new().with_results(nutrition_passages());

        let controller = controller_with(llm, scorer, retriever);
        let result = controller.run("query").await;

        assert!(matches!(result, Err(AgentError::ScoreParse { .. })));
    }

    #[tokio::test]
    async fn test_zero_budget_rejected() {
        let llm = MockLlmProvider::new("gen");
        let scorer = MockLlmProvider::new("scorer");
        let retriever = MockRetriever::new();

        let config = WorkflowConfig {
            loop_max_iter: 0,
            ..WorkflowConfig::default()
        };
        let controller = RefinementController::new(
            Arc::new(llm),
            Arc::new(retriever),
            config,
        )
        .with_scorer(Arc::new(scorer));

        let result = controller.run("query").await;
        assert!(matches!(result, Err(AgentError::Configuration { .. })));
    }

    // Prompt plumbing: the expansion prompt carries accumulated feedback and
    // crafting sees the same notes

    #[tokio::test]
    async fn test_query_feedback_reaches_expansion_and_generation() {
        let llm = MockLlmProvider::new("gen").with_fallback_reply("text");
        let scorer = MockLlmProvider::new("scorer")
            .with_reply("5.0")
            .with_reply("2.0")
            .with_reply("5.0")
            .with_fallback_reply("4.5");
        let retriever = MockRetriever::new().with_results(nutrition_passages());
        let llm = Arc::new(llm);

        let controller = RefinementController::new(
            llm.clone(),
            Arc::new(retriever),
            WorkflowConfig::default(),
        )
        .with_scorer(Arc::new(scorer));

        controller.run("anemia").await.unwrap();

        // calls: 0 expand, 1 craft, 2 refine_query, 3 expand, 4 craft
        let second_expand = llm.user_prompt(3).unwrap();
        assert!(second_expand.contains("Previous Expanded Query:"));

        let second_craft = llm.user_prompt(4).unwrap();
        assert!(second_craft.contains("feedback: Previous Expanded Query:"));
    }
}
