//! Run-scoped shared state for a single trial.
//!
//! Every role reads from and writes to one `SharedState` handle. Values are
//! either scalars (`topic`) or ordered string sequences (findings, feedback).
//!
//! ```text
//! topic               scalar, set once by the entry controller
//! positive_findings   appended by the admirer only
//! negative_findings   appended by the critic only
//! review_feedback     appended by the judge only
//! ```
//!
//! Readers that need a consistent view across keys take a `StateSnapshot`
//! after the gathering stage's join barrier.

pub mod store;
pub mod types;

pub use store::SharedState;
pub use types::{keys, StateSnapshot, StateValue};
