use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Tunables of the portal engine. Every field has a default, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Quiet period before an in-progress form is written as a draft.
    pub draft_quiet_period_ms: u64,
    /// Drafts are stored under `{draft_key_prefix}{form_id}`.
    pub draft_key_prefix: String,
    /// Rows per page in the applications table.
    pub page_size: usize,
    /// Columns shown the first time the applications table receives data.
    pub default_visible_columns: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            draft_quiet_period_ms: 2000,
            draft_key_prefix: "draft_".to_string(),
            page_size: 10,
            default_visible_columns: [
                "Full Name",
                "Insurance Type",
                "City",
                "Status",
                "Submitted Date",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl PortalConfig {
    pub fn builder() -> PortalConfigBuilder {
        PortalConfigBuilder::default()
    }

    /// Load a config from a JSON file, falling back to defaults for missing keys.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn draft_quiet_period(&self) -> Duration {
        Duration::from_millis(self.draft_quiet_period_ms)
    }
}

#[derive(Debug, Default)]
pub struct PortalConfigBuilder {
    config: PortalConfig,
}

impl PortalConfigBuilder {
    pub fn draft_quiet_period(mut self, quiet: Duration) -> Self {
        self.config.draft_quiet_period_ms = quiet.as_millis() as u64;
        self
    }

    pub fn draft_key_prefix(mut self, prefix: &str) -> Self {
        self.config.draft_key_prefix = prefix.to_string();
        self
    }

    /// Page sizes below one are raised to one.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size.max(1);
        self
    }

    pub fn default_visible_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.default_visible_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> PortalConfig {
        self.config
    }
}
