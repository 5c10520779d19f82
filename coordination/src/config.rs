//! Trial loop configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Safety cap on review iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;
/// Per-call timeout applied to every external collaborator.
pub const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 120;
/// How many times the entry controller re-prompts for a topic.
pub const DEFAULT_MAX_TOPIC_ATTEMPTS: u32 = 3;
/// Length of the raw lookup excerpt used when the model returns nothing.
pub const DEFAULT_FINDING_EXCERPT_CHARS: usize = 600;

/// Knobs for one trial run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Maximum review iterations before a forced conclusion.
    pub max_iterations: u32,
    /// Timeout for each model / lookup / store / prompt call, in seconds.
    pub collaborator_timeout_secs: u64,
    /// Topic prompt attempts before the entry controller gives up.
    pub max_topic_attempts: u32,
    /// Fallback excerpt length for findings.
    pub finding_excerpt_chars: usize,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            collaborator_timeout_secs: DEFAULT_COLLABORATOR_TIMEOUT_SECS,
            max_topic_attempts: DEFAULT_MAX_TOPIC_ATTEMPTS,
            finding_excerpt_chars: DEFAULT_FINDING_EXCERPT_CHARS,
        }
    }
}

impl TrialConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    /// Validate the config; return an error string if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be > 0".to_string());
        }
        if self.collaborator_timeout_secs == 0 {
            return Err("collaborator_timeout_secs must be > 0".to_string());
        }
        if self.max_topic_attempts == 0 {
            return Err("max_topic_attempts must be > 0".to_string());
        }
        if self.finding_excerpt_chars == 0 {
            return Err("finding_excerpt_chars must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let cfg = TrialConfig::default();
        cfg.validate().expect("default config should be valid");
        assert_eq!(cfg.max_iterations, 5);
        assert_eq!(cfg.collaborator_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn zero_max_iterations_rejected() {
        let cfg = TrialConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: TrialConfig = serde_json::from_str(r#"{"max_iterations": 2}"#).unwrap();
        assert_eq!(cfg.max_iterations, 2);
        assert_eq!(cfg.max_topic_attempts, DEFAULT_MAX_TOPIC_ATTEMPTS);
    }
}
