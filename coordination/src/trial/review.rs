//! Judge review step. Decides whether the loop continues.
//!
//! The judge replies in a small line protocol:
//!
//! ```text
//! DECISION: INSUFFICIENT
//! ADMIRER: NONE
//! CRITIC: find more about the later years scandals
//! BOTH: cite specific dates
//! ```
//!
//! Anything that is not a clear `SUFFICIENT` is treated as insufficient, and
//! an insufficient review always leaves at least one feedback entry behind.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collaborators::{with_timeout, ModelInvoker, PromptContext, Role};
use crate::config::TrialConfig;
use crate::errors::{TrialError, TrialResult};
use crate::state::{keys, SharedState};

use super::feedback::{Feedback, FeedbackTarget};

/// Used when the judge wants more but does not say what.
pub const DEFAULT_FEEDBACK: &str =
    "gather more specific, well-sourced evidence (names, dates, outcomes)";

/// Outcome of one review. Exactly one per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    /// Evidence is balanced and specific; stop looping.
    Sufficient,
    /// Keep investigating; `feedback` has already been appended to state.
    Insufficient { feedback: Vec<Feedback> },
}

impl ReviewDecision {
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Self::Sufficient)
    }

    pub fn feedback(&self) -> &[Feedback] {
        match self {
            Self::Sufficient => &[],
            Self::Insufficient { feedback } => feedback,
        }
    }
}

/// Parsed judge reply, before feedback is stamped with a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JudgeReply {
    pub sufficient: bool,
    pub instructions: Vec<(FeedbackTarget, String)>,
}

impl JudgeReply {
    pub fn parse(raw: &str) -> Self {
        let mut reply = JudgeReply::default();
        let mut loose = Vec::new();

        for line in raw.lines() {
            // Tolerate markdown decoration such as `**DECISION:**` or `- CRITIC:`.
            let cleaned = line
                .trim()
                .trim_start_matches(['-', '#', '>', ' '])
                .replace("**", "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                continue;
            }

            let Some((label, value)) = cleaned.split_once(':') else {
                loose.push(cleaned.to_string());
                continue;
            };
            let value = value.trim();
            let label = label.trim().to_ascii_uppercase();

            if label == "DECISION" {
                reply.sufficient = value.to_ascii_uppercase().starts_with("SUFFICIENT");
                continue;
            }

            match label.to_ascii_lowercase().parse::<FeedbackTarget>() {
                Ok(target) => {
                    if !value.is_empty() && !value.eq_ignore_ascii_case("none") {
                        reply.instructions.push((target, value.to_string()));
                    }
                }
                Err(_) => loose.push(cleaned.to_string()),
            }
        }

        // Free-form critique with no addressed lines goes to both researchers.
        if !reply.sufficient && reply.instructions.is_empty() && !loose.is_empty() {
            reply
                .instructions
                .push((FeedbackTarget::Both, loose.join(" ")));
        }
        reply
    }
}

/// The judge.
pub struct ReviewStep {
    model: Arc<dyn ModelInvoker>,
    timeout: Duration,
}

impl ReviewStep {
    pub fn new(model: Arc<dyn ModelInvoker>, config: &TrialConfig) -> Self {
        Self {
            model,
            timeout: config.collaborator_timeout(),
        }
    }

    /// Review the evidence gathered so far in `round`.
    ///
    /// Never touches the finding keys. On `Insufficient` the returned feedback
    /// has already been appended to `review_feedback`.
    pub async fn run(&self, state: &SharedState, round: u32) -> TrialResult<ReviewDecision> {
        let snapshot = state.snapshot();
        let ctx = PromptContext::new(Role::Judge)
            .section("Topic", snapshot.topic())
            .list_section("Positive evidence", &snapshot.list(keys::POSITIVE_FINDINGS))
            .list_section("Negative evidence", &snapshot.list(keys::NEGATIVE_FINDINGS));

        let raw = with_timeout("invoke", self.timeout, self.model.invoke(&ctx))
            .await
            .map_err(|source| TrialError::Review { round, source })?;

        let reply = JudgeReply::parse(&raw);
        if reply.sufficient {
            info!(round, "judge found the evidence sufficient");
            return Ok(ReviewDecision::Sufficient);
        }

        let mut instructions = reply.instructions;
        if instructions.is_empty() {
            instructions.push((FeedbackTarget::Both, DEFAULT_FEEDBACK.to_string()));
        }

        let feedback: Vec<Feedback> = instructions
            .into_iter()
            .map(|(target, text)| Feedback::new(round, target, text))
            .collect();
        for fb in &feedback {
            state.append(keys::REVIEW_FEEDBACK, fb.to_string());
        }
        info!(round, entries = feedback.len(), "judge requested more evidence");

        Ok(ReviewDecision::Insufficient { feedback })
    }
}
