//! Engine configuration with TOML file support.

use ballotguard_abuse::AbuseConfig;
use ballotguard_crypto::{Entropy, SigningSecret};
use ballotguard_types::ElectionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid signing secret: {0}")]
    Secret(String),
}

/// Configuration for a vote orchestrator.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Election that cast votes are counted in.
    #[serde(default = "default_election_id")]
    pub election_id: String,

    /// Sliding rate-limit window in milliseconds.
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,

    /// Maximum requests per source inside one window.
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: usize,

    /// Failures after which a source is flagged as suspicious.
    #[serde(default = "default_suspicion_threshold")]
    pub suspicion_threshold: u32,

    /// Idle time after which a sweep forgets a source's failure count.
    #[serde(default = "default_failure_memory_ms")]
    pub failure_memory_ms: u64,

    /// Cap on per-source entries in each abuse map.
    #[serde(default = "default_max_tracked_sources")]
    pub max_tracked_sources: usize,

    /// Lifetime of issued security tokens.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,

    /// Attempts at drawing an unused receipt code.
    #[serde(default = "default_receipt_code_attempts")]
    pub receipt_code_attempts: u32,

    /// Attempts at committing a vote when the store reports a conflict.
    #[serde(default = "default_commit_retries")]
    pub commit_retries: u32,

    /// Hex-encoded HMAC key. Generated per process when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_election_id() -> String {
    "general".to_string()
}

fn default_rate_limit_window_ms() -> u64 {
    60_000
}

fn default_rate_limit_max_requests() -> usize {
    10
}

fn default_suspicion_threshold() -> u32 {
    3
}

fn default_failure_memory_ms() -> u64 {
    86_400_000
}

fn default_max_tracked_sources() -> usize {
    10_000
}

fn default_token_ttl_minutes() -> u64 {
    15
}

fn default_receipt_code_attempts() -> u32 {
    8
}

fn default_commit_retries() -> u32 {
    8
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn election_id(&self) -> ElectionId {
        ElectionId::new(self.election_id.clone())
    }

    pub fn abuse_config(&self) -> AbuseConfig {
        AbuseConfig {
            window_ms: self.rate_limit_window_ms,
            max_requests: self.rate_limit_max_requests,
            suspicion_threshold: self.suspicion_threshold,
            failure_memory_ms: self.failure_memory_ms,
            max_tracked_sources: self.max_tracked_sources,
        }
    }

    /// The configured signing secret, or a freshly generated one.
    ///
    /// A generated secret lives only as long as the process, so signatures
    /// and tokens it issues cannot be verified after a restart.
    pub fn signing_secret(&self, entropy: &dyn Entropy) -> Result<SigningSecret, ConfigError> {
        match &self.signing_secret {
            Some(hex) => {
                SigningSecret::from_hex(hex).map_err(|e| ConfigError::Secret(e.to_string()))
            }
            None => {
                tracing::warn!("no signing secret configured, generating an ephemeral one");
                SigningSecret::generate(entropy).map_err(|e| ConfigError::Secret(e.to_string()))
            }
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            election_id: default_election_id(),
            rate_limit_window_ms: default_rate_limit_window_ms(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            suspicion_threshold: default_suspicion_threshold(),
            failure_memory_ms: default_failure_memory_ms(),
            max_tracked_sources: default_max_tracked_sources(),
            token_ttl_minutes: default_token_ttl_minutes(),
            receipt_code_attempts: default_receipt_code_attempts(),
            commit_retries: default_commit_retries(),
            signing_secret: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
