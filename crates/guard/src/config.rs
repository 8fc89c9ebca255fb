//! Guard configuration.

use common::{GuardError, GuardResult};
use guard_security::SourceMatching;
use networking::ClientConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Id of the element the guard removes from the page on install.
pub const DEFAULT_MARKER_ID: &str = "pageguard";

/// Guard configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Policy to enforce. Overrides the page's own policy meta element.
    pub declared_policy: Option<String>,
    /// How allow-list tokens are matched against request origins.
    pub source_matching: SourceMatching,
    /// Id of the marker element removed on install.
    pub marker_id: String,
    /// Whether editable fields are sanitized.
    pub sanitize_inputs: bool,
    /// Whether legacy requests are checked for transport-identity mismatches.
    pub monitor_transport_identity: bool,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Maximum redirects.
    pub max_redirects: u32,
    /// User agent override.
    pub user_agent: Option<String>,
}

impl GuardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> GuardResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> GuardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> GuardResult<()> {
        if self.marker_id.trim().is_empty() {
            return Err(GuardError::config("marker_id must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(GuardError::config("timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn with_declared_policy(mut self, policy: &str) -> Self {
        self.declared_policy = Some(policy.to_string());
        self
    }

    pub fn with_source_matching(mut self, matching: SourceMatching) -> Self {
        self.source_matching = matching;
        self
    }

    pub fn with_marker_id(mut self, marker_id: &str) -> Self {
        self.marker_id = marker_id.to_string();
        self
    }

    pub fn with_sanitize_inputs(mut self, enabled: bool) -> Self {
        self.sanitize_inputs = enabled;
        self
    }

    pub fn with_transport_monitoring(mut self, enabled: bool) -> Self {
        self.monitor_transport_identity = enabled;
        self
    }

    /// Settings for the HTTP client.
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_redirects: self.max_redirects,
            ..ClientConfig::default()
        };
        if let Some(ua) = &self.user_agent {
            client.user_agent = ua.clone();
        }
        client
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            declared_policy: None,
            source_matching: SourceMatching::Literal,
            marker_id: DEFAULT_MARKER_ID.to_string(),
            sanitize_inputs: true,
            monitor_transport_identity: true,
            timeout_secs: client.timeout.as_secs(),
            connect_timeout_secs: client.connect_timeout.as_secs(),
            max_redirects: client.max_redirects,
            user_agent: None,
        }
    }
}
