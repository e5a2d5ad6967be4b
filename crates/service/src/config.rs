use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use hookwork_audit::RedactConfig;
use hookwork_core::{ActionMgtError, ActionType};

/// Configuration for the action management service.
///
/// ```toml
/// max_actions_per_type = 1
/// lock_ttl_ms = 30000
///
/// [limits]
/// PRE_ISSUE_ACCESS_TOKEN = 3
///
/// [audit]
/// enabled = true
/// redact_fields = ["password", "accessToken", "value"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Maximum number of actions of one type per tenant. Defaults to 1.
    #[serde(default = "default_max_actions_per_type")]
    pub max_actions_per_type: u32,

    /// Per-type overrides of `max_actions_per_type`, keyed by canonical type
    /// name.
    #[serde(default)]
    pub limits: HashMap<String, u32>,

    /// TTL of the serialization locks taken by `add` and `update`.
    #[serde(default = "default_lock_ttl_ms")]
    pub lock_ttl_ms: u64,

    /// How long to wait for a serialization lock before failing.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default)]
    pub audit: AuditConfig,
}

/// Audit emission settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Whether mutations are recorded at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Endpoint authentication properties to redact.
    #[serde(default = "default_redact_fields")]
    pub redact_fields: Vec<String>,

    /// Replacement text for redacted values.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_actions_per_type: default_max_actions_per_type(),
            limits: HashMap::new(),
            lock_ttl_ms: default_lock_ttl_ms(),
            lock_timeout_ms: default_lock_timeout_ms(),
            audit: AuditConfig::default(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_fields: default_redact_fields(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_max_actions_per_type() -> u32 {
    1
}

fn default_lock_ttl_ms() -> u64 {
    30_000
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

fn default_redact_fields() -> Vec<String> {
    RedactConfig::default().fields
}

fn default_placeholder() -> String {
    RedactConfig::default().placeholder
}

impl ServiceConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ActionMgtError> {
        let config: Self =
            toml::from_str(s).map_err(|e| ActionMgtError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ActionMgtError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ActionMgtError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check that every `[limits]` key names a known action type.
    pub fn validate(&self) -> Result<(), ActionMgtError> {
        for name in self.limits.keys() {
            ActionType::from_name(name).map_err(|_| {
                ActionMgtError::Configuration(format!("unknown action type in [limits]: {name}"))
            })?;
        }
        Ok(())
    }

    /// Set a per-type limit.
    #[must_use]
    pub fn with_limit(mut self, action_type: ActionType, max: u32) -> Self {
        self.limits.insert(action_type.name().to_owned(), max);
        self
    }

    /// The effective quota for `action_type`.
    pub fn max_for(&self, action_type: ActionType) -> u32 {
        self.limits
            .get(action_type.name())
            .copied()
            .unwrap_or(self.max_actions_per_type)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_millis(self.lock_ttl_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl AuditConfig {
    pub fn redact_config(&self) -> RedactConfig {
        RedactConfig::new(self.redact_fields.clone()).with_placeholder(self.placeholder.clone())
    }
}
