//! Concrete collaborators for the historical moot court.
//!
//! - [`agents`]: rig-core agents, one per role, behind `ModelInvoker`
//! - [`wikipedia`]: MediaWiki lookup behind `KnowledgeSource`
//! - [`storage`]: file-backed `VerdictStore`
//! - [`console`]: stdin and fixed `TopicPrompt`s
//! - [`court`]: [`Court`], which wires them to the coordination pipeline

pub mod agents;
pub mod config;
pub mod console;
pub mod court;
pub mod prompts;
pub mod storage;
pub mod wikipedia;

pub use config::CourtConfig;
pub use court::Court;
