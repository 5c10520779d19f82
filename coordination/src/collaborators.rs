//! Contracts for the external collaborators the trial core depends on.
//!
//! The core never talks to a network, a filesystem, or a terminal directly.
//! Concrete adapters live in the agents crate; tests use scripted in-process
//! implementations.
//!
//! | Trait             | Used by                      |
//! |-------------------|------------------------------|
//! | `ModelInvoker`    | gathering, review, synthesis |
//! | `KnowledgeSource` | gathering                    |
//! | `VerdictStore`    | synthesis                    |
//! | `TopicPrompt`     | entry controller             |

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CollaboratorError;

/// The four roles of the court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Researches achievements and legacy.
    Admirer,
    /// Researches controversies and failures.
    Critic,
    /// Reviews the evidence and controls the loop.
    Judge,
    /// Writes the final neutral report.
    Scribe,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Self::Admirer, Self::Critic, Self::Judge, Self::Scribe]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admirer => write!(f, "admirer"),
            Self::Critic => write!(f, "critic"),
            Self::Judge => write!(f, "judge"),
            Self::Scribe => write!(f, "scribe"),
        }
    }
}

/// One titled block of state made visible to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSection {
    pub title: String,
    pub body: String,
}

/// Everything a role is allowed to see for one model call.
///
/// Role instructions (preambles) belong to the model adapter; the core only
/// decides which state reaches which role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptContext {
    pub role: Role,
    pub sections: Vec<PromptSection>,
}

impl PromptContext {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.sections.push(PromptSection {
            title: title.into(),
            body: body.into(),
        });
        self
    }

    /// Add a numbered list section; empty lists render as `(none)`.
    pub fn list_section(self, title: impl Into<String>, items: &[String]) -> Self {
        let body = if items.is_empty() {
            "(none)".to_string()
        } else {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, item))
                .collect::<Vec<_>>()
                .join("\n")
        };
        self.section(title, body)
    }

    /// Body of the first section with the given title.
    pub fn section_body(&self, title: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.body.as_str())
    }

    /// Markdown rendering handed to the model as the user prompt.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| format!("## {}\n\n{}", s.title, s.body))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Language-model invocation.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Turn role-visible state into role output. May return empty text.
    async fn invoke(&self, ctx: &PromptContext) -> Result<String, CollaboratorError>;
}

/// Knowledge lookup used by the researchers.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// `Ok(None)` means the source had nothing for this query.
    async fn search(&self, query: &str) -> Result<Option<String>, CollaboratorError>;
}

/// Durable storage for the final verdict.
#[async_trait]
pub trait VerdictStore: Send + Sync {
    /// Persist `content` under `name`; returns a confirmation (e.g. the path).
    async fn save(&self, name: &str, content: &str) -> Result<String, CollaboratorError>;
}

/// Caller interaction that supplies the trial topic.
#[async_trait]
pub trait TopicPrompt: Send + Sync {
    async fn prompt_topic(&self) -> Result<String, CollaboratorError>;
}

/// Run a collaborator call under a per-call timeout.
pub async fn with_timeout<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout { operation, timeout }),
    }
}
