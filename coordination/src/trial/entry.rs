//! Entry controller: obtains the topic and starts the pipeline.

use std::sync::Arc;

use tracing::{info, warn};

use crate::collaborators::TopicPrompt;
use crate::config::TrialConfig;
use crate::errors::{TrialError, TrialResult};
use crate::state::{keys, SharedState};

use super::pipeline::{TrialReport, WorkflowPipeline};

/// Trim a candidate topic; reject it if nothing is left.
pub fn validate_topic(raw: &str) -> Result<String, String> {
    let topic = raw.trim();
    if topic.is_empty() {
        return Err("topic is empty".to_string());
    }
    Ok(topic.to_string())
}

pub struct EntryController {
    prompt: Arc<dyn TopicPrompt>,
    pipeline: WorkflowPipeline,
    config: TrialConfig,
}

impl EntryController {
    pub fn new(prompt: Arc<dyn TopicPrompt>, pipeline: WorkflowPipeline, config: TrialConfig) -> Self {
        Self {
            prompt,
            pipeline,
            config,
        }
    }

    /// Ask for a topic (re-prompting on empty input), then run the trial.
    pub async fn start(&self) -> TrialResult<TrialReport> {
        let topic = self.obtain_topic().await?;
        self.run_trial(&topic).await
    }

    /// Run a trial for a topic the caller already has.
    pub async fn run_trial(&self, topic: &str) -> TrialResult<TrialReport> {
        let topic = validate_topic(topic).map_err(|reason| TrialError::InvalidTopic {
            attempts: 1,
            reason,
        })?;

        // Fresh state per run; dropped once the verdict is written.
        let state = SharedState::new();
        state.set(keys::TOPIC, topic.as_str());
        info!(topic = %topic, "trial opened");

        self.pipeline.run(&state).await
    }

    async fn obtain_topic(&self) -> TrialResult<String> {
        let attempts = self.config.max_topic_attempts.max(1);
        let mut last_reason = String::new();

        // A person is typing; the answer is not bounded by the collaborator timeout.
        for attempt in 1..=attempts {
            let raw = match self.prompt.prompt_topic().await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(attempt, error = %e, "topic prompt failed");
                    last_reason = e.to_string();
                    continue;
                }
            };
            match validate_topic(&raw) {
                Ok(topic) => return Ok(topic),
                Err(reason) => {
                    warn!(attempt, max = attempts, "rejected topic: {reason}");
                    last_reason = reason;
                }
            }
        }

        Err(TrialError::InvalidTopic {
            attempts,
            reason: last_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims() {
        assert_eq!(validate_topic("  Genghis Khan \n").unwrap(), "Genghis Khan");
    }

    #[test]
    fn validate_rejects_blank() {
        assert!(validate_topic("").is_err());
        assert!(validate_topic(" \t\n").is_err());
    }
}
