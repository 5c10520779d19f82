//! The library entry point that wires concrete collaborators into a [`Court`].

use std::sync::Arc;

use anyhow::{Context, Result};
use coordination::{
    Collaborators, EntryController, TopicPrompt, TrialConfig, TrialError, TrialReport,
    TrialResult, WorkflowPipeline,
};
use tracing::info;

use crate::agents::AgentFactory;
use crate::config::CourtConfig;
use crate::prompts::PROMPT_VERSION;
use crate::storage::FileVerdictStore;
use crate::wikipedia::WikipediaSource;

/// A ready-to-run moot court.
pub struct Court {
    controller: EntryController,
}

impl Court {
    /// Wire arbitrary collaborators (tests, alternative backends).
    pub fn new(collaborators: Collaborators, prompt: Arc<dyn TopicPrompt>, config: TrialConfig) -> Self {
        let pipeline = WorkflowPipeline::new(&collaborators, &config);
        Self {
            controller: EntryController::new(prompt, pipeline, config),
        }
    }

    /// Rig agents, Wikipedia, and the file store, all from `config`.
    pub fn from_config(config: &CourtConfig, prompt: Arc<dyn TopicPrompt>) -> Result<Self> {
        config
            .validate()
            .map_err(TrialError::Configuration)
            .context("invalid configuration")?;

        let factory = AgentFactory::new(config).context("failed to build agents")?;
        let knowledge = WikipediaSource::new(config.wikipedia.clone())
            .context("failed to build Wikipedia client")?;
        let collaborators = Collaborators {
            model: Arc::new(factory.build_model()),
            knowledge: Arc::new(knowledge),
            store: Arc::new(FileVerdictStore::new(&config.verdict_dir)),
        };

        info!(
            endpoint = %config.endpoint.base_url,
            judge_model = %config.models.judge,
            prompt_version = PROMPT_VERSION,
            max_iterations = config.trial.max_iterations,
            verdict_dir = %config.verdict_dir.display(),
            "court assembled"
        );
        Ok(Self::new(collaborators, prompt, config.trial.clone()))
    }

    /// Ask for a topic, then hold the trial.
    pub async fn start(&self) -> TrialResult<TrialReport> {
        self.controller.start().await
    }

    /// Hold a trial for `topic`.
    pub async fn run_trial(&self, topic: &str) -> TrialResult<TrialReport> {
        self.controller.run_trial(topic).await
    }
}
