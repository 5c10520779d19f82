//! Synthesis step: the scribe's neutral report, written once per trial.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::collaborators::{with_timeout, ModelInvoker, PromptContext, Role, VerdictStore};
use crate::config::TrialConfig;
use crate::errors::{TrialError, TrialResult};
use crate::state::{keys, SharedState, StateSnapshot};

use super::state::Conclusion;

const VERDICT_SUFFIX: &str = "_verdict.txt";
/// Common filesystem limit on a single path component.
const MAX_FILE_NAME_BYTES: usize = 255;

/// Storage name for a topic's verdict.
///
/// Whitespace becomes `_`; alphanumerics, `-` and `_` are kept; everything
/// else is dropped. `"Genghis Khan"` → `Genghis_Khan_verdict.txt`. Long
/// stems are cut on a char boundary so the name fits in 255 bytes.
pub fn verdict_file_name(topic: &str) -> String {
    let mut stem: String = topic
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect();
    let budget = MAX_FILE_NAME_BYTES - VERDICT_SUFFIX.len();
    if stem.len() > budget {
        let mut cut = budget;
        while !stem.is_char_boundary(cut) {
            cut -= 1;
        }
        stem.truncate(cut);
    }
    let stem = if stem.is_empty() { "untitled" } else { &stem };
    format!("{stem}{VERDICT_SUFFIX}")
}

/// The persisted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictArtifact {
    /// Name the store saved it under.
    pub name: String,
    pub content: String,
    /// Whatever the store returned (for the file store, the path).
    pub confirmation: String,
    /// `true` when the scribe said nothing and the minimal report was used.
    pub fallback: bool,
}

/// Deterministic report used when the scribe returns nothing.
pub fn minimal_report(snapshot: &StateSnapshot, conclusion: Conclusion) -> String {
    let mut out = format!("Verdict: {}\n", snapshot.topic());
    out.push_str(&format!("Conclusion: {conclusion}\n"));

    for (title, key) in [
        ("Positive evidence", keys::POSITIVE_FINDINGS),
        ("Negative evidence", keys::NEGATIVE_FINDINGS),
    ] {
        out.push_str(&format!("\n{title}:\n"));
        let items = snapshot.list(key);
        if items.is_empty() {
            out.push_str("- (none)\n");
        }
        for item in items {
            out.push_str(&format!("- {item}\n"));
        }
    }
    out
}

/// The scribe plus the store it writes to.
pub struct SynthesisStep {
    model: Arc<dyn ModelInvoker>,
    store: Arc<dyn VerdictStore>,
    timeout: Duration,
}

impl SynthesisStep {
    pub fn new(
        model: Arc<dyn ModelInvoker>,
        store: Arc<dyn VerdictStore>,
        config: &TrialConfig,
    ) -> Self {
        Self {
            model,
            store,
            timeout: config.collaborator_timeout(),
        }
    }

    /// Write the verdict for a concluded loop.
    pub async fn run(
        &self,
        state: &SharedState,
        conclusion: Conclusion,
    ) -> TrialResult<VerdictArtifact> {
        let snapshot = state.snapshot();
        let outcome = match conclusion {
            Conclusion::Sufficient => "The judge found the evidence sufficient.",
            Conclusion::Forced => {
                "The iteration cap was reached before the judge was satisfied; \
                 the evidence may be incomplete."
            }
        };
        let ctx = PromptContext::new(Role::Scribe)
            .section("Topic", snapshot.topic())
            .list_section("Positive evidence", &snapshot.list(keys::POSITIVE_FINDINGS))
            .list_section("Negative evidence", &snapshot.list(keys::NEGATIVE_FINDINGS))
            .section("Trial outcome", outcome);

        let report = with_timeout("invoke", self.timeout, self.model.invoke(&ctx))
            .await
            .map_err(TrialError::Synthesis)?;

        let (content, fallback) = if report.trim().is_empty() {
            warn!(topic = %snapshot.topic(), "scribe returned nothing; writing minimal report");
            (minimal_report(&snapshot, conclusion), true)
        } else {
            (report.trim().to_string(), false)
        };

        let name = verdict_file_name(snapshot.topic());
        let confirmation = with_timeout("save", self.timeout, self.store.save(&name, &content))
            .await
            .map_err(|source| TrialError::Persistence {
                name: name.clone(),
                source,
            })?;
        info!(name = %name, confirmation = %confirmation, fallback, "verdict saved");

        Ok(VerdictArtifact {
            name,
            content,
            confirmation,
            fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CollaboratorError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedScribe(&'static str);

    #[async_trait]
    impl ModelInvoker for FixedScribe {
        async fn invoke(&self, ctx: &PromptContext) -> Result<String, CollaboratorError> {
            assert_eq!(ctx.role, Role::Scribe);
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl VerdictStore for MemoryStore {
        async fn save(&self, name: &str, content: &str) -> Result<String, CollaboratorError> {
            self.saved
                .lock()
                .unwrap()
                .push((name.to_string(), content.to_string()));
            Ok(format!("memory://{name}"))
        }
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl VerdictStore for ReadOnlyStore {
        async fn save(&self, _name: &str, _content: &str) -> Result<String, CollaboratorError> {
            Err(CollaboratorError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn seeded_state() -> SharedState {
        let state = SharedState::new();
        state.set(keys::TOPIC, "Test Monarch");
        state.append(keys::POSITIVE_FINDINGS, "built roads");
        state.append(keys::NEGATIVE_FINDINGS, "raised taxes");
        state
    }

    #[test]
    fn file_names() {
        assert_eq!(verdict_file_name("Genghis Khan"), "Genghis_Khan_verdict.txt");
        assert_eq!(verdict_file_name("Test Monarch"), "Test_Monarch_verdict.txt");
        assert_eq!(
            verdict_file_name("Louis XIV (Sun King)"),
            "Louis_XIV_Sun_King_verdict.txt"
        );
        assert_eq!(verdict_file_name("../etc/passwd"), "etcpasswd_verdict.txt");
        assert_eq!(verdict_file_name("  "), "untitled_verdict.txt");
    }

    #[test]
    fn long_topics_fit_a_path_component() {
        let topic = "Emperor ".repeat(40);
        let name = verdict_file_name(&topic);
        assert!(name.len() <= MAX_FILE_NAME_BYTES, "{} bytes", name.len());
        assert!(name.starts_with("Emperor_Emperor_"));
        assert!(name.ends_with(VERDICT_SUFFIX));
    }

    #[test]
    fn long_multibyte_topics_cut_on_char_boundary() {
        // One ASCII byte, then three-byte chars: the budget lands mid-character.
        let topic = format!("A{}", "成吉思汗".repeat(30));
        let name = verdict_file_name(&topic);
        assert!(name.len() <= MAX_FILE_NAME_BYTES);
        assert!(name.ends_with(VERDICT_SUFFIX));
        let stem = name.trim_end_matches(VERDICT_SUFFIX);
        assert!(stem.starts_with('A'));
        assert!(stem.chars().skip(1).all(|c| "成吉思汗".contains(c)));
        assert_eq!((stem.len() - 1) % 3, 0);
    }

    #[test]
    fn minimal_report_lists_evidence() {
        let state = seeded_state();
        let report = minimal_report(&state.snapshot(), Conclusion::Forced);
        assert!(report.contains("Verdict: Test Monarch"));
        assert!(report.contains("Conclusion: forced"));
        assert!(report.contains("- built roads"));
        assert!(report.contains("- raised taxes"));
    }

    #[tokio::test]
    async fn saves_scribe_report_under_derived_name() {
        let state = seeded_state();
        let store = Arc::new(MemoryStore::default());
        let step = SynthesisStep::new(
            Arc::new(FixedScribe("  A balanced report.  ")),
            store.clone(),
            &TrialConfig::default(),
        );

        let artifact = step.run(&state, Conclusion::Sufficient).await.unwrap();
        assert_eq!(artifact.name, "Test_Monarch_verdict.txt");
        assert_eq!(artifact.content, "A balanced report.");
        assert_eq!(artifact.confirmation, "memory://Test_Monarch_verdict.txt");
        assert!(!artifact.fallback);
        assert_eq!(store.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_scribe_output_uses_minimal_report() {
        let state = seeded_state();
        let store = Arc::new(MemoryStore::default());
        let step = SynthesisStep::new(Arc::new(FixedScribe("")), store.clone(), &TrialConfig::default());

        let artifact = step.run(&state, Conclusion::Forced).await.unwrap();
        assert!(artifact.fallback);
        assert!(artifact.content.contains("built roads"));
        assert_eq!(store.saved.lock().unwrap()[0].1, artifact.content);
    }

    #[tokio::test]
    async fn store_failure_is_fatal() {
        let state = seeded_state();
        let step = SynthesisStep::new(
            Arc::new(FixedScribe("report")),
            Arc::new(ReadOnlyStore),
            &TrialConfig::default(),
        );
        let err = step.run(&state, Conclusion::Sufficient).await.unwrap_err();
        assert!(matches!(err, TrialError::Persistence { ref name, .. } if name == "Test_Monarch_verdict.txt"));
    }
}
