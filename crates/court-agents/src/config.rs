//! Runtime configuration for the moot court.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variable overrides (`MOOT_*`)
//! 3. Values from an optional TOML file (`--config`)
//! 4. Built-in defaults
//!
//! ## Model roles
//!
//! | Role    | Env override         | Temperature           |
//! |---------|----------------------|-----------------------|
//! | admirer | `MOOT_ADMIRER_MODEL` | `researcher_temperature` |
//! | critic  | `MOOT_CRITIC_MODEL`  | `researcher_temperature` |
//! | judge   | `MOOT_JUDGE_MODEL`   | `judge_temperature`   |
//! | scribe  | `MOOT_SCRIBE_MODEL`  | `scribe_temperature`  |
//!
//! `MOOT_MODEL` sets all four at once; a per-role variable wins over it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coordination::{Role, TrialConfig};
use rig::providers::openai;
use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible inference endpoint.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";
/// Default model alias for every role.
const DEFAULT_MODEL: &str = "Qwen2.5-14B-Instruct";
/// Default MediaWiki API endpoint.
const DEFAULT_WIKIPEDIA_URL: &str = "https://en.wikipedia.org/w/api.php";
/// Pages summarized per lookup.
const DEFAULT_TOP_K_RESULTS: usize = 3;
/// Cap on the text returned by one lookup.
const DEFAULT_MAX_LOOKUP_CHARS: usize = 4_000;
/// Where verdicts are written.
const DEFAULT_VERDICT_DIR: &str = "verdicts";

const ENV_BASE_URL: &str = "MOOT_BASE_URL";
const ENV_API_KEY: &str = "MOOT_API_KEY";
const ENV_MODEL: &str = "MOOT_MODEL";
const ENV_ADMIRER_MODEL: &str = "MOOT_ADMIRER_MODEL";
const ENV_CRITIC_MODEL: &str = "MOOT_CRITIC_MODEL";
const ENV_JUDGE_MODEL: &str = "MOOT_JUDGE_MODEL";
const ENV_SCRIBE_MODEL: &str = "MOOT_SCRIBE_MODEL";
const ENV_WIKIPEDIA_URL: &str = "MOOT_WIKIPEDIA_URL";
const ENV_VERDICT_DIR: &str = "MOOT_VERDICT_DIR";
const ENV_MAX_ITERATIONS: &str = "MOOT_MAX_ITERATIONS";
const ENV_TIMEOUT_SECS: &str = "MOOT_TIMEOUT_SECS";

/// OpenAI-compatible endpoint serving every role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL (e.g. `http://localhost:8080/v1`).
    pub base_url: String,
    /// API key; most local servers accept any non-empty value.
    pub api_key: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "local".to_string(),
        }
    }
}

/// Per-role model assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleModels {
    pub admirer: String,
    pub critic: String,
    pub judge: String,
    pub scribe: String,
}

impl Default for RoleModels {
    fn default() -> Self {
        Self::uniform(DEFAULT_MODEL)
    }
}

impl RoleModels {
    pub fn uniform(model: &str) -> Self {
        Self {
            admirer: model.to_string(),
            critic: model.to_string(),
            judge: model.to_string(),
            scribe: model.to_string(),
        }
    }

    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::Admirer => &self.admirer,
            Role::Critic => &self.critic,
            Role::Judge => &self.judge,
            Role::Scribe => &self.scribe,
        }
    }
}

/// MediaWiki lookup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaConfig {
    pub api_url: String,
    pub top_k_results: usize,
    pub max_chars: usize,
    pub user_agent: String,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_WIKIPEDIA_URL.to_string(),
            top_k_results: DEFAULT_TOP_K_RESULTS,
            max_chars: DEFAULT_MAX_LOOKUP_CHARS,
            user_agent: format!("moot-court/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Top-level configuration consumed by the binary and [`crate::Court`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtConfig {
    pub endpoint: EndpointConfig,
    pub models: RoleModels,
    /// Admirer and critic.
    pub researcher_temperature: f64,
    /// Lower keeps the decision line stable.
    pub judge_temperature: f64,
    pub scribe_temperature: f64,
    pub wikipedia: WikipediaConfig,
    pub verdict_dir: PathBuf,
    pub trial: TrialConfig,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            models: RoleModels::default(),
            researcher_temperature: 0.4,
            judge_temperature: 0.1,
            scribe_temperature: 0.3,
            wikipedia: WikipediaConfig::default(),
            verdict_dir: PathBuf::from(DEFAULT_VERDICT_DIR),
            trial: TrialConfig::default(),
        }
    }
}

impl CourtConfig {
    /// Defaults, then the TOML file (if any), then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `MOOT_*` overrides. `lookup` abstracts the environment for tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.endpoint.base_url = v;
        }
        if let Some(v) = lookup(ENV_API_KEY) {
            self.endpoint.api_key = v;
        }
        if let Some(v) = lookup(ENV_MODEL) {
            self.models = RoleModels::uniform(&v);
        }
        for (key, slot) in [
            (ENV_ADMIRER_MODEL, &mut self.models.admirer),
            (ENV_CRITIC_MODEL, &mut self.models.critic),
            (ENV_JUDGE_MODEL, &mut self.models.judge),
            (ENV_SCRIBE_MODEL, &mut self.models.scribe),
        ] {
            if let Some(v) = lookup(key) {
                *slot = v;
            }
        }
        if let Some(v) = lookup(ENV_WIKIPEDIA_URL) {
            self.wikipedia.api_url = v;
        }
        if let Some(v) = lookup(ENV_VERDICT_DIR) {
            self.verdict_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_MAX_ITERATIONS) {
            self.trial.max_iterations = v
                .parse()
                .with_context(|| format!("{ENV_MAX_ITERATIONS} must be a positive integer, got '{v}'"))?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS) {
            self.trial.collaborator_timeout_secs = v
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a positive integer, got '{v}'"))?;
        }
        Ok(())
    }

    /// Temperature for a role's agent.
    pub fn temperature_for(&self, role: Role) -> f64 {
        match role {
            Role::Admirer | Role::Critic => self.researcher_temperature,
            Role::Judge => self.judge_temperature,
            Role::Scribe => self.scribe_temperature,
        }
    }

    /// Validate all sub-configs.
    pub fn validate(&self) -> Result<(), String> {
        self.trial.validate()?;
        if self.endpoint.base_url.trim().is_empty() {
            return Err("endpoint.base_url must not be empty".to_string());
        }
        for role in Role::all() {
            if self.models.for_role(*role).trim().is_empty() {
                return Err(format!("model for role '{role}' must not be empty"));
            }
            let t = self.temperature_for(*role);
            if !(0.0..=1.0).contains(&t) {
                return Err(format!("{role} temperature must be in [0, 1], got {t}"));
            }
        }
        if self.wikipedia.top_k_results == 0 {
            return Err("wikipedia.top_k_results must be > 0".to_string());
        }
        if self.wikipedia.max_chars == 0 {
            return Err("wikipedia.max_chars must be > 0".to_string());
        }
        Ok(())
    }

    /// Build a Rig OpenAI-compatible client pointed at the configured endpoint.
    pub fn client(&self) -> Result<openai::CompletionsClient> {
        openai::CompletionsClient::builder()
            .api_key(&self.endpoint.api_key)
            .base_url(&self.endpoint.base_url)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build inference client: {e}"))
    }
}
