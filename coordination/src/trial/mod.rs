//! The moot court trial: iterative multi-agent review loop.
//!
//! ```text
//! EntryController ── topic ──► WorkflowPipeline
//!                                  │
//!                                  ▼
//!                 ┌──────── ReviewLoop ────────┐
//!                 │  ConcurrentGatheringStage  │   admirer ∥ critic
//!                 │            │               │
//!                 │            ▼               │
//!                 │        ReviewStep ─────────┼─► Sufficient / cap
//!                 └──── feedback ◄─────────────┘
//!                                  │
//!                                  ▼
//!                            SynthesisStep ──► VerdictStore
//! ```
//!
//! All steps read and write one [`SharedState`](crate::state::SharedState)
//! per run.

pub mod entry;
pub mod feedback;
pub mod gathering;
pub mod orchestrator;
pub mod pipeline;
pub mod researcher;
pub mod review;
pub mod state;
pub mod synthesis;

pub use entry::{validate_topic, EntryController};
pub use feedback::{feedback_for, Feedback, FeedbackTarget};
pub use gathering::{ConcurrentGatheringStage, FailedSide, StageReport};
pub use orchestrator::{LoopOutcome, ReviewLoop};
pub use pipeline::{Collaborators, TrialReport, WorkflowPipeline};
pub use researcher::{
    excerpt, Finding, GatheringTask, Polarity, MAX_FOCUS_WORDS, MAX_QUERY_CHARS,
};
pub use review::{JudgeReply, ReviewDecision, ReviewStep, DEFAULT_FEEDBACK};
pub use state::{
    Conclusion, IterationRecord, TransitionError, TrialPhase, TrialSession, TrialTransition,
};
pub use synthesis::{minimal_report, verdict_file_name, SynthesisStep, VerdictArtifact};
