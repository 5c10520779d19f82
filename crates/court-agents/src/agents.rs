//! Agent builders for the four court roles.
//!
//! Each role gets its own rig agent (own preamble, own model, own
//! temperature). `RigModel` routes a `PromptContext` to the agent for its
//! role and implements `coordination::ModelInvoker`.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use coordination::{CollaboratorError, ModelInvoker, PromptContext, Role};
use rig::agent::Agent;
use rig::client::CompletionClient;
use rig::completion::{Prompt, PromptError};
use rig::providers::openai;
use tracing::debug;

use crate::config::CourtConfig;
use crate::prompts;

/// Type alias for agents built from OpenAI-compatible endpoints.
pub type OaiAgent = Agent<openai::completion::CompletionModel>;

/// Build the agent for one role.
pub fn build_role_agent(
    client: &openai::CompletionsClient,
    model: &str,
    role: Role,
    temperature: f64,
) -> OaiAgent {
    client
        .agent(model)
        .name(&role.to_string())
        .description(prompts::description_for(role))
        .preamble(prompts::preamble_for(role))
        .temperature(temperature)
        .build()
}

/// Factory that builds all role agents from a `CourtConfig`.
pub struct AgentFactory {
    pub client: openai::CompletionsClient,
    pub config: CourtConfig,
}

impl AgentFactory {
    pub fn new(config: &CourtConfig) -> Result<Self> {
        Ok(Self {
            client: config.client()?,
            config: config.clone(),
        })
    }

    pub fn build(&self, role: Role) -> OaiAgent {
        build_role_agent(
            &self.client,
            self.config.models.for_role(role),
            role,
            self.config.temperature_for(role),
        )
    }

    /// One agent per role behind a single `ModelInvoker`.
    pub fn build_model(&self) -> RigModel {
        RigModel {
            agents: Role::all()
                .iter()
                .map(|role| (*role, self.build(*role)))
                .collect(),
        }
    }
}

/// Role-routed rig agents.
pub struct RigModel {
    agents: HashMap<Role, OaiAgent>,
}

#[async_trait]
impl ModelInvoker for RigModel {
    async fn invoke(&self, ctx: &PromptContext) -> Result<String, CollaboratorError> {
        let agent = self.agents.get(&ctx.role).ok_or_else(|| {
            CollaboratorError::Unavailable(format!("no agent configured for role '{}'", ctx.role))
        })?;

        let prompt = ctx.render();
        debug!(role = %ctx.role, prompt_chars = prompt.len(), "invoking agent");
        let response: String = agent.prompt(&prompt).await.map_err(classify_prompt_error)?;
        debug!(role = %ctx.role, response_chars = response.len(), "agent replied");
        Ok(response)
    }
}

/// Map a rig failure onto the collaborator taxonomy.
fn classify_prompt_error(err: PromptError) -> CollaboratorError {
    let message = err.to_string();
    if is_transient_error(&message) {
        CollaboratorError::Unavailable(message)
    } else {
        CollaboratorError::InvalidResponse(message)
    }
}

/// Whether an inference error string looks like a backend hiccup.
pub fn is_transient_error(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    // HTTP status codes
    message.contains("502")
        || message.contains("503")
        || message.contains("429")
        // Connection-level failures (reqwest)
        || lower.contains("connection")
        || lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("error sending request")
        || lower.contains("broken pipe")
        || lower.contains("reset by peer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_detected() {
        assert!(is_transient_error("HTTP 503 Service Unavailable"));
        assert!(is_transient_error("error sending request for url"));
        assert!(is_transient_error("Connection refused"));
        assert!(!is_transient_error("JsonError: missing field `choices`"));
    }

    #[tokio::test]
    async fn factory_builds_model_for_every_role() {
        let factory = AgentFactory::new(&CourtConfig::default()).unwrap();
        let model = factory.build_model();
        for role in Role::all() {
            assert!(model.agents.contains_key(role));
        }
    }
}
