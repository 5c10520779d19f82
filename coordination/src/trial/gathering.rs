//! Concurrent gathering stage: fan-out/fan-in over all researchers.
//!
//! ```text
//! JoinSet::spawn(admirer.run) ─┐
//!                              ├─ join barrier → StageReport
//! JoinSet::spawn(critic.run)  ─┘
//! ```
//!
//! ## Partial failure policy
//!
//! A researcher that errors or panics contributes nothing for the round; the
//! other side's finding still stands and the stage still returns normally.
//! Whether the evidence is good enough is the judge's call, not the stage's.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::CollaboratorError;
use crate::state::SharedState;

use super::researcher::{Finding, GatheringTask, Polarity};

/// One side that contributed nothing this round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSide {
    pub polarity: Polarity,
    pub reason: String,
}

/// Everything the stage produced in one round.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    pub findings: Vec<Finding>,
    pub failures: Vec<FailedSide>,
}

impl StageReport {
    /// Findings appended for `polarity` this round.
    pub fn added(&self, polarity: Polarity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.polarity == polarity)
            .count()
    }

    pub fn failed_sides(&self) -> Vec<Polarity> {
        self.failures.iter().map(|f| f.polarity).collect()
    }
}

/// Runs every configured researcher in parallel and waits for all of them.
pub struct ConcurrentGatheringStage {
    tasks: Vec<Arc<GatheringTask>>,
}

impl ConcurrentGatheringStage {
    pub fn new(tasks: Vec<GatheringTask>) -> Self {
        Self {
            tasks: tasks.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn polarities(&self) -> Vec<Polarity> {
        self.tasks.iter().map(|t| t.polarity()).collect()
    }

    /// Run all researchers for `round`. Returns only after every branch has
    /// finished, in whatever order they finish.
    pub async fn run(&self, state: &SharedState, round: u32) -> StageReport {
        let mut join_set: JoinSet<(Polarity, Result<Finding, CollaboratorError>)> =
            JoinSet::new();

        for task in &self.tasks {
            let task = Arc::clone(task);
            let state = state.clone();
            join_set.spawn(async move {
                let start = Instant::now();
                let result = task.run(&state, round).await;
                debug!(
                    polarity = %task.polarity(),
                    round,
                    ok = result.is_ok(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "researcher finished"
                );
                (task.polarity(), result)
            });
        }

        let mut report = StageReport::default();
        let mut reported = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((polarity, Ok(finding))) => {
                    reported.push(polarity);
                    report.findings.push(finding);
                }
                Ok((polarity, Err(e))) => {
                    warn!(
                        polarity = %polarity,
                        round,
                        transient = e.is_transient(),
                        error = %e,
                        "researcher failed; side contributes nothing this round"
                    );
                    reported.push(polarity);
                    report.failures.push(FailedSide {
                        polarity,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    // Panicked task: attributed below by elimination.
                    warn!(round, error = %e, "researcher task panicked");
                }
            }
        }

        for polarity in self.polarities() {
            if !reported.contains(&polarity) {
                report.failures.push(FailedSide {
                    polarity,
                    reason: "researcher task panicked".to_string(),
                });
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{KnowledgeSource, ModelInvoker, PromptContext};
    use crate::config::TrialConfig;
    use crate::state::keys;
    use async_trait::async_trait;
    use std::time::Duration;

    struct EchoModel;

    #[async_trait]
    impl ModelInvoker for EchoModel {
        async fn invoke(&self, ctx: &PromptContext) -> Result<String, CollaboratorError> {
            Ok(ctx.section_body("Search results").unwrap_or("").to_string())
        }
    }

    /// Sleeps, then answers with a fixed text.
    struct DelayedSource {
        delay: Duration,
        text: &'static str,
    }

    #[async_trait]
    impl KnowledgeSource for DelayedSource {
        async fn search(&self, _query: &str) -> Result<Option<String>, CollaboratorError> {
            tokio::time::sleep(self.delay).await;
            Ok(Some(self.text.to_string()))
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl KnowledgeSource for BrokenSource {
        async fn search(&self, _query: &str) -> Result<Option<String>, CollaboratorError> {
            Err(CollaboratorError::Unavailable("wiki down".into()))
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl KnowledgeSource for PanickingSource {
        async fn search(&self, _query: &str) -> Result<Option<String>, CollaboratorError> {
            panic!("lookup exploded");
        }
    }

    fn researcher(polarity: Polarity, source: Arc<dyn KnowledgeSource>) -> GatheringTask {
        GatheringTask::new(polarity, Arc::new(EchoModel), source, &TrialConfig::default())
    }

    fn delayed(ms: u64, text: &'static str) -> Arc<dyn KnowledgeSource> {
        Arc::new(DelayedSource {
            delay: Duration::from_millis(ms),
            text,
        })
    }

    fn topic_state() -> SharedState {
        let state = SharedState::new();
        state.set(keys::TOPIC, "Test Monarch");
        state
    }

    async fn assert_barrier(positive_ms: u64, negative_ms: u64) {
        let state = topic_state();
        let stage = ConcurrentGatheringStage::new(vec![
            researcher(Polarity::Positive, delayed(positive_ms, "built roads")),
            researcher(Polarity::Negative, delayed(negative_ms, "raised taxes")),
        ]);

        let start = tokio::time::Instant::now();
        let report = stage.run(&state, 1).await;
        let elapsed = start.elapsed();

        assert_eq!(state.list(keys::POSITIVE_FINDINGS), vec!["built roads"]);
        assert_eq!(state.list(keys::NEGATIVE_FINDINGS), vec!["raised taxes"]);
        assert_eq!(report.findings.len(), 2);
        assert!(report.failures.is_empty());

        // Branches overlap: total time tracks the slower branch, not the sum.
        let slower = Duration::from_millis(positive_ms.max(negative_ms));
        assert!(elapsed >= slower);
        assert!(elapsed < Duration::from_millis(positive_ms + negative_ms));
    }

    #[tokio::test(start_paused = true)]
    async fn barrier_waits_for_slow_positive_branch() {
        assert_barrier(400, 20).await;
    }

    #[tokio::test(start_paused = true)]
    async fn barrier_waits_for_slow_negative_branch() {
        assert_barrier(20, 400).await;
    }

    #[tokio::test]
    async fn failed_side_is_contained() {
        let state = topic_state();
        let stage = ConcurrentGatheringStage::new(vec![
            researcher(Polarity::Positive, delayed(0, "built roads")),
            researcher(Polarity::Negative, Arc::new(BrokenSource)),
        ]);

        let report = stage.run(&state, 1).await;
        assert_eq!(report.added(Polarity::Positive), 1);
        assert_eq!(report.added(Polarity::Negative), 0);
        assert_eq!(report.failed_sides(), vec![Polarity::Negative]);
        assert!(report.failures[0].reason.contains("wiki down"));
        assert_eq!(state.count(keys::POSITIVE_FINDINGS), 1);
        assert_eq!(state.count(keys::NEGATIVE_FINDINGS), 0);
    }

    #[tokio::test]
    async fn panicked_side_is_attributed() {
        let state = topic_state();
        let stage = ConcurrentGatheringStage::new(vec![
            researcher(Polarity::Positive, Arc::new(PanickingSource)),
            researcher(Polarity::Negative, delayed(0, "raised taxes")),
        ]);

        let report = stage.run(&state, 1).await;
        assert_eq!(report.failed_sides(), vec![Polarity::Positive]);
        assert_eq!(report.added(Polarity::Negative), 1);
    }
}
