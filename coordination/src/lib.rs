//! Historical moot court: coordination core.
//!
//! A bounded review loop over shared trial state:
//!
//! - **Admirer** and **Critic** researchers gather opposing evidence in parallel
//! - the **Judge** reviews it and either stops the loop or sends feedback
//! - the **Scribe** writes one neutral verdict once the loop concludes
//!
//! This crate performs no network or filesystem I/O itself. Models, knowledge
//! lookup, verdict storage and the topic prompt are reached through the traits
//! in [`collaborators`].
//!
//! # Usage
//!
//! ```ignore
//! let pipeline = WorkflowPipeline::new(&collaborators, &config);
//! let court = EntryController::new(prompt, pipeline, config);
//! let report = court.run_trial("Genghis Khan").await?;
//! println!("{}", report.verdict.confirmation);
//! ```

pub mod collaborators;
pub mod config;
pub mod errors;
pub mod state;
pub mod trial;

pub use collaborators::{
    KnowledgeSource, ModelInvoker, PromptContext, PromptSection, Role, TopicPrompt, VerdictStore,
};
pub use config::TrialConfig;
pub use errors::{CollaboratorError, TrialError, TrialResult};
pub use state::{keys, SharedState, StateSnapshot, StateValue};
pub use trial::{
    Collaborators, Conclusion, EntryController, LoopOutcome, ReviewDecision, TrialReport,
    VerdictArtifact, WorkflowPipeline,
};
