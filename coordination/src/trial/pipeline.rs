//! Workflow pipeline: review loop, then synthesis.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collaborators::{KnowledgeSource, ModelInvoker, VerdictStore};
use crate::config::TrialConfig;
use crate::errors::{TrialError, TrialResult};
use crate::state::SharedState;

use super::gathering::ConcurrentGatheringStage;
use super::orchestrator::{LoopOutcome, ReviewLoop};
use super::researcher::{GatheringTask, Polarity};
use super::review::ReviewStep;
use super::synthesis::{SynthesisStep, VerdictArtifact};

/// The external collaborators one trial needs.
#[derive(Clone)]
pub struct Collaborators {
    pub model: Arc<dyn ModelInvoker>,
    pub knowledge: Arc<dyn KnowledgeSource>,
    pub store: Arc<dyn VerdictStore>,
}

/// What a finished trial produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialReport {
    pub outcome: LoopOutcome,
    pub verdict: VerdictArtifact,
}

pub struct WorkflowPipeline {
    review_loop: ReviewLoop,
    synthesis: SynthesisStep,
}

impl WorkflowPipeline {
    /// Wire an admirer and a critic, the judge, and the scribe.
    pub fn new(collaborators: &Collaborators, config: &TrialConfig) -> Self {
        let tasks = Polarity::all()
            .into_iter()
            .map(|polarity| {
                GatheringTask::new(
                    polarity,
                    Arc::clone(&collaborators.model),
                    Arc::clone(&collaborators.knowledge),
                    config,
                )
            })
            .collect();

        Self {
            review_loop: ReviewLoop::new(
                ConcurrentGatheringStage::new(tasks),
                ReviewStep::new(Arc::clone(&collaborators.model), config),
                config.max_iterations,
            ),
            synthesis: SynthesisStep::new(
                Arc::clone(&collaborators.model),
                Arc::clone(&collaborators.store),
                config,
            ),
        }
    }

    /// Run the loop to conclusion, then write the verdict exactly once.
    ///
    /// `state` must already hold a non-empty topic.
    pub async fn run(&self, state: &SharedState) -> TrialResult<TrialReport> {
        if state.snapshot().topic().trim().is_empty() {
            return Err(TrialError::InvalidTopic {
                attempts: 0,
                reason: "topic is not set".to_string(),
            });
        }

        let outcome = self.review_loop.run(state).await?;
        let verdict = self.synthesis.run(state, outcome.conclusion).await?;
        info!(
            conclusion = %outcome.conclusion,
            iterations = outcome.iterations,
            verdict = %verdict.name,
            "trial complete"
        );
        Ok(TrialReport { outcome, verdict })
    }
}
