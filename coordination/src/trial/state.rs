//! Trial state machine: phases, transitions, and iteration history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::researcher::Polarity;

/// How the review loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    /// The judge found the evidence balanced and specific.
    Sufficient,
    /// The iteration cap was reached first.
    Forced,
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sufficient => write!(f, "sufficient"),
            Self::Forced => write!(f, "forced"),
        }
    }
}

/// Phase of a trial session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialPhase {
    /// Researchers are gathering evidence.
    Investigating,
    /// The judge is evaluating the evidence.
    Reviewing,
    /// Terminal; no further iteration may run.
    Concluded(Conclusion),
}

impl TrialPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Concluded(_))
    }

    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> &'static [TrialPhase] {
        match self {
            Self::Investigating => &[Self::Reviewing],
            Self::Reviewing => &[
                Self::Investigating,
                Self::Concluded(Conclusion::Sufficient),
                Self::Concluded(Conclusion::Forced),
            ],
            Self::Concluded(_) => &[],
        }
    }
}

impl std::fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Investigating => write!(f, "investigating"),
            Self::Reviewing => write!(f, "reviewing"),
            Self::Concluded(c) => write!(f, "concluded_{}", c),
        }
    }
}

/// What happened in one investigate → review iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Round number (1-indexed).
    pub round: u32,
    /// Findings appended per side this round.
    pub positive_added: usize,
    pub negative_added: usize,
    /// Sides whose gathering task failed this round.
    pub failed_sides: Vec<Polarity>,
    /// Whether the judge declared the evidence sufficient.
    pub sufficient: bool,
    /// Encoded feedback entries the judge appended.
    pub feedback: Vec<String>,
    /// Wall-clock duration of the iteration.
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
}

/// A phase transition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialTransition {
    pub from: TrialPhase,
    pub to: TrialPhase,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// Error for invalid state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition {from} → {to}: {reason}")]
pub struct TransitionError {
    pub from: TrialPhase,
    pub to: TrialPhase,
    pub reason: String,
}

/// One trial run: current phase plus full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSession {
    /// Unique run identifier.
    pub id: String,
    pub topic: String,
    pub phase: TrialPhase,
    /// Current round number (starts at 1).
    pub current_round: u32,
    pub max_rounds: u32,
    pub rounds: Vec<IterationRecord>,
    pub transitions: Vec<TrialTransition>,
    pub created_at: DateTime<Utc>,
}

impl TrialSession {
    /// Create a session already in `Investigating`, round 1.
    pub fn new(topic: &str, max_rounds: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            phase: TrialPhase::Investigating,
            current_round: 1,
            max_rounds,
            rounds: Vec::new(),
            transitions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Transition to a new phase with a reason.
    pub fn transition(&mut self, to: TrialPhase, reason: &str) -> Result<(), TransitionError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
                reason: format!(
                    "not a valid transition (allowed: {:?})",
                    self.phase.valid_transitions()
                ),
            });
        }

        self.transitions.push(TrialTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });

        // Looping back to investigation starts the next round.
        if self.phase == TrialPhase::Reviewing && to == TrialPhase::Investigating {
            self.current_round += 1;
        }
        self.phase = to;
        Ok(())
    }

    pub fn record_round(&mut self, record: IterationRecord) {
        self.rounds.push(record);
    }

    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Whether another full iteration fits under the cap.
    pub fn has_rounds_remaining(&self) -> bool {
        self.current_round < self.max_rounds
    }

    pub fn conclusion(&self) -> Option<Conclusion> {
        match self.phase {
            TrialPhase::Concluded(c) => Some(c),
            _ => None,
        }
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] round {}/{} | {} rounds recorded | topic={}",
            self.phase,
            self.current_round,
            self.max_rounds,
            self.rounds.len(),
            self.topic
        )
    }
}
