// Trait definition for plugin sources and the request/result types they share

use crate::error::ResolveError;
use crate::sources::context::ResolveContext;
use crate::sources::hash::HashAlgorithm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything needed to resolve one plugin from one source.
///
/// Only some fields are meaningful for a given source: Hangar reads
/// `platform`, Modrinth reads `loader` and `game_versions`, the storage
/// source reads `bucket` and `key`, the URL source reads `url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginRequest {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Version constraint; empty or `latest` means no constraint.
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub game_versions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PluginRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn version(mut self, constraint: impl Into<String>) -> Self {
        self.version = constraint.into();
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn loader(mut self, loader: impl Into<String>) -> Self {
        self.loader = Some(loader.into());
        self
    }

    pub fn game_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.game_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Returns the named optional field if it is present and not blank.
    pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
        field.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Where the resolved artifact can be fetched from. Exactly one per artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    #[serde(rename = "url")]
    Url(String),
    #[serde(rename = "s3_uri")]
    StorageUri(String),
}

impl Locator {
    pub fn as_str(&self) -> &str {
        match self {
            Locator::Url(s) | Locator::StorageUri(s) => s,
        }
    }
}

/// Result of resolving a plugin request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArtifact {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,
    #[serde(flatten)]
    pub locator: Locator,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hashes: BTreeMap<HashAlgorithm, String>,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedArtifact {
    /// Start an artifact stamped with the current time; adapters fill in
    /// the optional fields afterwards.
    pub fn new(source: &str, version: impl Into<String>, locator: Locator) -> Self {
        Self {
            source: source.to_string(),
            project: None,
            version: version.into(),
            build: None,
            platform: None,
            loader: None,
            locator,
            hashes: BTreeMap::new(),
            resolved_at: Utc::now(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.locator {
            Locator::Url(url) => Some(url),
            Locator::StorageUri(_) => None,
        }
    }

    pub fn storage_uri(&self) -> Option<&str> {
        match &self.locator {
            Locator::StorageUri(uri) => Some(uri),
            Locator::Url(_) => None,
        }
    }

    pub fn hash(&self, algorithm: HashAlgorithm) -> Option<&str> {
        self.hashes.get(&algorithm).map(String::as_str)
    }
}

/// Trait for plugin sources (Hangar, Modrinth, PaperMC, S3, direct URL)
///
/// Implementations hold no per-call state, so one instance can serve
/// concurrent `resolve` calls.
#[async_trait::async_trait]
pub trait PluginSource: Send + Sync {
    /// Stable lowercase source name (e.g. "hangar", "modrinth")
    fn identifier(&self) -> &'static str;

    /// Check the request carries the fields this source needs
    fn validate(&self, _request: &PluginRequest) -> Result<(), ResolveError> {
        Ok(())
    }

    /// Resolve the request to exactly one artifact
    ///
    /// Every network call made here must go through `ctx` so that
    /// cancellation and deadlines are honoured.
    async fn resolve(
        &self,
        request: &PluginRequest,
        ctx: &ResolveContext,
    ) -> Result<ResolvedArtifact, ResolveError>;
}
