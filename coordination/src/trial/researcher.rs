//! Polarity-biased researchers (the admirer and the critic).
//!
//! Both sides run the same `GatheringTask`; only the `Polarity` differs.
//! A task reads the topic and the judge's previous-round feedback, builds a
//! biased query, looks it up, has the model condense the hits into one
//! finding, and appends that finding to its own state key.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collaborators::{with_timeout, KnowledgeSource, ModelInvoker, PromptContext, Role};
use crate::config::TrialConfig;
use crate::errors::CollaboratorError;
use crate::state::{keys, SharedState};

use super::feedback::feedback_for;

/// Upper bound on a search query; MediaWiki rejects longer search strings.
pub const MAX_QUERY_CHARS: usize = 300;
/// Judge feedback words carried into a query.
pub const MAX_FOCUS_WORDS: usize = 12;

/// Which side of the argument a researcher argues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Achievements, legacy, reforms.
    Positive,
    /// Controversies, failures, criticism.
    Negative,
}

impl Polarity {
    pub fn all() -> [Polarity; 2] {
        [Self::Positive, Self::Negative]
    }

    /// The role that argues this side.
    pub fn role(self) -> Role {
        match self {
            Self::Positive => Role::Admirer,
            Self::Negative => Role::Critic,
        }
    }

    /// The only state key this side may write.
    pub fn target_key(self) -> &'static str {
        match self {
            Self::Positive => keys::POSITIVE_FINDINGS,
            Self::Negative => keys::NEGATIVE_FINDINGS,
        }
    }

    /// Search-bias keywords, rotated one per round.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Positive => &["achievements", "success", "legacy", "honors", "reforms"],
            Self::Negative => &[
                "controversy",
                "war crimes",
                "failures",
                "criticism",
                "scandals",
            ],
        }
    }

    fn keyword_for_round(self, round: u32) -> &'static str {
        let words = self.keywords();
        words[(round.saturating_sub(1) as usize) % words.len()]
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

/// One unit of evidence appended by a researcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub polarity: Polarity,
    pub content: String,
    /// The query that produced it.
    pub query: String,
    /// `false` when the lookup came back empty and the finding only notes that.
    pub sourced: bool,
}

/// A researcher configured for one polarity.
pub struct GatheringTask {
    polarity: Polarity,
    model: Arc<dyn ModelInvoker>,
    knowledge: Arc<dyn KnowledgeSource>,
    timeout: Duration,
    excerpt_chars: usize,
}

impl GatheringTask {
    pub fn new(
        polarity: Polarity,
        model: Arc<dyn ModelInvoker>,
        knowledge: Arc<dyn KnowledgeSource>,
        config: &TrialConfig,
    ) -> Self {
        Self {
            polarity,
            model,
            knowledge,
            timeout: config.collaborator_timeout(),
            excerpt_chars: config.finding_excerpt_chars,
        }
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Topic, then this round's bias keyword, then a short judge focus.
    ///
    /// The result never exceeds [`MAX_QUERY_CHARS`]; only the focus is cut
    /// (at a word boundary, after [`MAX_FOCUS_WORDS`] words) to make room.
    pub fn build_query(&self, topic: &str, feedback: &[String], round: u32) -> String {
        let keyword = self.polarity.keyword_for_round(round);
        let topic_budget = MAX_QUERY_CHARS.saturating_sub(keyword.chars().count() + 1);
        let topic: String = topic.trim().chars().take(topic_budget).collect();
        let mut query = format!("{} {}", topic.trim_end(), keyword);

        let focus = feedback
            .iter()
            .flat_map(|f| f.split_whitespace())
            .take(MAX_FOCUS_WORDS);
        for word in focus {
            if query.chars().count() + 1 + word.chars().count() > MAX_QUERY_CHARS {
                break;
            }
            query.push(' ');
            query.push_str(word);
        }
        query
    }

    /// Gather one finding for `round` and append it to this side's key.
    pub async fn run(&self, state: &SharedState, round: u32) -> Result<Finding, CollaboratorError> {
        let snapshot = state.snapshot();
        let topic = snapshot.topic().to_string();
        let feedback = feedback_for(
            &snapshot.list(keys::REVIEW_FEEDBACK),
            round.saturating_sub(1),
            self.polarity,
        );
        let query = self.build_query(&topic, &feedback, round);
        debug!(polarity = %self.polarity, round, query = %query, "searching");

        let hits = with_timeout("search", self.timeout, self.knowledge.search(&query)).await?;

        let finding = match hits.filter(|text| !text.trim().is_empty()) {
            Some(text) => {
                let ctx = PromptContext::new(self.polarity.role())
                    .section("Topic", topic.as_str())
                    .list_section("Judge feedback", &feedback)
                    .section("Search query", query.as_str())
                    .section("Search results", text.as_str());
                let summary = with_timeout("invoke", self.timeout, self.model.invoke(&ctx)).await?;
                let content = if summary.trim().is_empty() {
                    excerpt(&text, self.excerpt_chars)
                } else {
                    summary.trim().to_string()
                };
                Finding {
                    polarity: self.polarity,
                    content,
                    query,
                    sourced: true,
                }
            }
            None => Finding {
                polarity: self.polarity,
                content: format!("No {} findings were found for \"{}\".", self.polarity, query),
                query,
                sourced: false,
            },
        };

        let len = state.append(self.polarity.target_key(), finding.content.clone());
        info!(
            polarity = %self.polarity,
            round,
            sourced = finding.sourced,
            total = len,
            "finding recorded"
        );
        Ok(finding)
    }
}

/// First `max_chars` characters of `text`, trimmed, with an ellipsis if cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
