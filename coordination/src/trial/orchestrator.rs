//! Review loop: drives the investigate → review cycle.
//!
//! Ties together the gathering stage, the judge, and the session state
//! machine. Iterations are strictly sequential: round `n + 1` starts only
//! after round `n`'s review has written its feedback.
//!
//! ```text
//! Investigating → Reviewing → Sufficient              → Concluded(Sufficient)
//!       ▲             │
//!       │             ├─ Insufficient, rounds left    → Investigating
//!       └─────────────┘
//!                     └─ Insufficient, cap reached    → Concluded(Forced)
//! ```

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::errors::TrialResult;
use crate::state::SharedState;

use super::gathering::ConcurrentGatheringStage;
use super::researcher::Polarity;
use super::review::{ReviewDecision, ReviewStep};
use super::state::{Conclusion, IterationRecord, TrialPhase, TrialSession};

/// Result of a concluded review loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopOutcome {
    pub conclusion: Conclusion,
    /// Full iterations executed.
    pub iterations: u32,
    /// Session snapshot at conclusion.
    pub session: TrialSession,
}

impl LoopOutcome {
    pub fn is_forced(&self) -> bool {
        self.conclusion == Conclusion::Forced
    }

    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        let status = match self.conclusion {
            Conclusion::Sufficient => "SUFFICIENT",
            Conclusion::Forced => "FORCED",
        };
        format!(
            "[{}] {} iteration(s) | topic={}",
            status, self.iterations, self.session.topic
        )
    }
}

/// Bounded investigate → review loop.
pub struct ReviewLoop {
    stage: ConcurrentGatheringStage,
    review: ReviewStep,
    max_iterations: u32,
}

impl ReviewLoop {
    pub fn new(stage: ConcurrentGatheringStage, review: ReviewStep, max_iterations: u32) -> Self {
        Self {
            stage,
            review,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run until the judge is satisfied or the cap is reached.
    ///
    /// Review errors abort the loop. Cap exhaustion is not an error: the loop
    /// concludes with `Conclusion::Forced` and whatever evidence exists.
    pub async fn run(&self, state: &SharedState) -> TrialResult<LoopOutcome> {
        let topic = state.snapshot().topic().to_string();
        let mut session = TrialSession::new(&topic, self.max_iterations);
        info!(session = %session.id, topic = %topic, max = self.max_iterations, "trial loop starting");

        loop {
            let round = session.current_round;
            info!(session = %session.id, status = %session.status_line(), "round starting");
            let started_at = Utc::now();
            let start = Instant::now();

            let report = self.stage.run(state, round).await;
            session.transition(TrialPhase::Reviewing, "evidence gathered")?;

            let decision = match self.review.run(state, round).await {
                Ok(decision) => decision,
                Err(e) => {
                    error!(
                        session = %session.id,
                        round,
                        transient = e.is_transient(),
                        error = %e,
                        "review failed; aborting trial"
                    );
                    return Err(e);
                }
            };

            session.record_round(IterationRecord {
                round,
                positive_added: report.added(Polarity::Positive),
                negative_added: report.added(Polarity::Negative),
                failed_sides: report.failed_sides(),
                sufficient: decision.is_sufficient(),
                feedback: decision.feedback().iter().map(|f| f.to_string()).collect(),
                duration_ms: start.elapsed().as_millis() as u64,
                started_at,
            });

            match decision {
                ReviewDecision::Sufficient => {
                    session.transition(
                        TrialPhase::Concluded(Conclusion::Sufficient),
                        "judge found evidence sufficient",
                    )?;
                    break;
                }
                ReviewDecision::Insufficient { .. } if session.has_rounds_remaining() => {
                    session.transition(TrialPhase::Investigating, "judge requested more evidence")?;
                }
                ReviewDecision::Insufficient { .. } => {
                    warn!(
                        session = %session.id,
                        iterations = round,
                        "forced conclusion: iteration cap reached without a sufficient judgment"
                    );
                    session.transition(
                        TrialPhase::Concluded(Conclusion::Forced),
                        "iteration cap reached",
                    )?;
                    break;
                }
            }
        }

        let outcome = LoopOutcome {
            conclusion: session.conclusion().unwrap_or(Conclusion::Forced),
            iterations: session.rounds.len() as u32,
            session,
        };
        info!(summary = %outcome.summary_line(), "trial loop concluded");
        Ok(outcome)
    }
}
