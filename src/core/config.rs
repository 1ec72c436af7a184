//! Agent configuration with documented defaults
//!
//! Values can be loaded from a TOML file; every section is optional and falls
//! back to the defaults below. Credentials never live in the file, they come
//! from the environment (see [`AdvisoryConfig::apply_env`]).

use crate::core::error::{AgentError, Result};
use crate::core::types::SideId;
use crate::policy::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound for `advisory.memory_exchanges`; every exchange is replayed on each call
pub const MAX_MEMORY_EXCHANGES: usize = 32;

/// Settings for the remote advisory service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Whether the advisory tier is consulted at all
    ///
    /// Even when enabled, a missing `LLM_API_KEY` disables it at runtime.
    pub enabled: bool,

    /// Chat-completions endpoint
    pub api_url: String,

    /// Model name sent in the request body
    pub model: String,

    /// Sampling temperature sent in the request body
    pub temperature: f32,

    /// Upper bound on reply length
    ///
    /// A well-behaved reply is a single directive, so this stays small.
    pub max_tokens: u32,

    /// Hard limit for one advisory round trip, in seconds
    ///
    /// After this the call counts as failed and the heuristic decides.
    pub timeout_secs: u64,

    /// Number of prior (prompt, reply) exchanges replayed to the service
    pub memory_exchanges: usize,

    /// Keyword that attaches the special transform to a move directive
    pub transform_keyword: String,

    /// Environment variable holding the bearer credential
    pub api_key_env: String,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.deepseek.com/v1/chat/completions".into(),
            model: "deepseek-chat".into(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 10,
            memory_exchanges: 3,
            transform_keyword: "terastallize".into(),
            api_key_env: "LLM_API_KEY".into(),
        }
    }
}

impl AdvisoryConfig {
    /// Apply `LLM_API_URL` / `LLM_MODEL` overrides from the environment
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("LLM_API_URL") {
            self.api_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.model = model;
        }
    }

    /// Read the bearer credential, if one is configured
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Which switch-ranking algorithm backs the heuristic tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchPolicy {
    /// Weighted HP/status score
    #[default]
    Scored,
    /// Linear scan that only upgrades on strictly higher HP and no status
    LegacyScan,
}

/// Randomized deviation from the top-ranked move
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    pub enabled: bool,

    /// Chance of sampling from the top-k instead of taking the best move
    pub probability: f64,

    /// How many of the best-ranked moves are eligible when exploring
    pub top_k: usize,

    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            probability: 0.2,
            top_k: 3,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub switch_policy: SwitchPolicy,
    pub exploration: ExplorationConfig,
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Side this agent plays
    ///
    /// Replaced by `side.id` from the first request that carries one.
    pub own_side: SideId,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            own_side: SideId::P2,
        }
    }
}

/// Locations of the read-only data files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dex_path: Option<PathBuf>,
    pub translations_path: Option<PathBuf>,
}

/// Complete agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub advisory: AdvisoryConfig,
    pub policy: PolicyConfig,
    pub battle: BattleConfig,
    pub data: DataConfig,
}

impl AgentConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AgentConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let exploration = &self.policy.exploration;
        if !(0.0..=1.0).contains(&exploration.probability) {
            return Err(AgentError::Config(format!(
                "exploration.probability ({}) must be within 0..=1",
                exploration.probability
            )));
        }
        if exploration.enabled && exploration.top_k == 0 {
            return Err(AgentError::Config(
                "exploration.top_k must be at least 1 when exploration is enabled".into(),
            ));
        }

        if self.advisory.memory_exchanges > MAX_MEMORY_EXCHANGES {
            return Err(AgentError::Config(format!(
                "advisory.memory_exchanges ({}) must be at most {}",
                self.advisory.memory_exchanges, MAX_MEMORY_EXCHANGES
            )));
        }

        if self.advisory.timeout_secs == 0 {
            return Err(AgentError::Config("advisory.timeout_secs must be positive".into()));
        }

        let keyword = self.advisory.transform_keyword.trim();
        if keyword.is_empty() || keyword.contains(char::is_whitespace) {
            return Err(AgentError::Config(format!(
                "advisory.transform_keyword ({:?}) must be a single word",
                self.advisory.transform_keyword
            )));
        }

        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| AgentError::Config(format!("Failed to read config {:?}: {}", path, e)))?;
    AgentConfig::from_toml(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.policy.exploration.enabled);
        assert_eq!(config.advisory.timeout_secs, 10);
        assert_eq!(config.advisory.memory_exchanges, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AgentConfig::from_toml(
            r#"
            [advisory]
            model = "local-model"

            [policy]
            switch_policy = "legacy-scan"

            [battle]
            own_side = "p1"
            "#,
        )
        .unwrap();

        assert_eq!(config.advisory.model, "local-model");
        assert_eq!(config.advisory.max_tokens, 500);
        assert_eq!(config.policy.switch_policy, SwitchPolicy::LegacyScan);
        assert_eq!(config.battle.own_side, SideId::P1);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let result = AgentConfig::from_toml(
            r#"
            [policy.exploration]
            enabled = true
            probability = 1.5
            "#,
        );
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_multiword_keyword_rejected() {
        let mut config = AgentConfig::default();
        config.advisory.transform_keyword = "tera now".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_memory_rejected() {
        let mut config = AgentConfig::default();
        config.advisory.memory_exchanges = MAX_MEMORY_EXCHANGES;
        assert!(config.validate().is_ok());
        config.advisory.memory_exchanges = usize::MAX;
        assert!(matches!(config.validate(), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let result = AgentConfig::from_toml("[advisory\nmodel = ");
        assert!(matches!(result, Err(AgentError::Toml(_))));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = AgentConfig::from_toml(include_str!("../../data/agent.toml")).unwrap();
        assert_eq!(config.policy.switch_policy, SwitchPolicy::Scored);
        assert_eq!(config.policy.weights.setup_bonus, 60.0);
        assert_eq!(config.battle.own_side, SideId::P2);
        assert!(config.data.dex_path.is_some());
    }
}
