// Config module for resolver settings (API endpoints, timeouts)

use crate::constants;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings shared by every adapter built from a registry.
///
/// Values come from defaults, then an optional TOML file, then
/// `SCAF_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub hangar_api: String,
    pub modrinth_api: String,
    pub papermc_api: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            hangar_api: constants::HANGAR_API_BASE.to_string(),
            modrinth_api: constants::MODRINTH_API_BASE.to_string(),
            papermc_api: constants::PAPERMC_API_BASE.to_string(),
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
            user_agent: constants::USER_AGENT.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Load from a TOML file. Keys that are absent keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config
            .trim_bases()
            .checked()
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Like [`ResolverConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay `SCAF_*` environment variables on top of `self`.
    pub fn with_env(self) -> anyhow::Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if let Some(v) = lookup("SCAF_HANGAR_API") {
            self.hangar_api = v;
        }
        if let Some(v) = lookup("SCAF_MODRINTH_API") {
            self.modrinth_api = v;
        }
        if let Some(v) = lookup("SCAF_PAPERMC_API") {
            self.papermc_api = v;
        }
        if let Some(v) = lookup("SCAF_TIMEOUT_SECS") {
            self.timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("SCAF_TIMEOUT_SECS must be a number, got '{}'", v))?;
        }
        if let Some(v) = lookup("SCAF_USER_AGENT") {
            self.user_agent = v;
        }
        self.trim_bases().checked()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A zero timeout would fail every request before it is sent
    fn checked(self) -> anyhow::Result<Self> {
        anyhow::ensure!(self.timeout_secs > 0, "timeout_secs must be at least 1");
        Ok(self)
    }

    fn trim_bases(mut self) -> Self {
        for base in [
            &mut self.hangar_api,
            &mut self.modrinth_api,
            &mut self.papermc_api,
        ] {
            while base.ends_with('/') {
                base.pop();
            }
        }
        self
    }
}
