// Modrinth source implementation

use crate::constants::{self, SOURCE_MODRINTH};
use crate::error::ResolveError;
use crate::sources::context::ResolveContext;
use crate::sources::hash::{self, HashAlgorithm};
use crate::sources::http::{self, Transport};
use crate::sources::source_trait::{Locator, PluginRequest, PluginSource, ResolvedArtifact};
use crate::sources::version_selector;
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Version {
    version_number: String,
    #[serde(default)]
    files: Vec<VersionFile>,
}

#[derive(Debug, Deserialize)]
struct VersionFile {
    url: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    hashes: FileHashes,
}

#[derive(Debug, Default, Deserialize)]
struct FileHashes {
    #[serde(default)]
    sha512: Option<String>,
    #[serde(default)]
    sha256: Option<String>,
}

impl Version {
    /// The file flagged primary, else the first one listed
    fn primary_file(&self) -> Option<&VersionFile> {
        self.files
            .iter()
            .find(|f| f.primary)
            .or_else(|| self.files.first())
    }
}

pub struct ModrinthSource {
    transport: Arc<dyn Transport>,
    api_base: String,
}

impl ModrinthSource {
    pub fn new(transport: Arc<dyn Transport>, api_base: impl Into<String>) -> Self {
        Self {
            transport,
            api_base: api_base.into(),
        }
    }

    fn project(request: &PluginRequest) -> Result<&str, ResolveError> {
        PluginRequest::non_empty(&request.project)
            .ok_or_else(|| ResolveError::missing_field(SOURCE_MODRINTH, "project"))
    }

    fn loader(request: &PluginRequest) -> String {
        PluginRequest::non_empty(&request.loader)
            .unwrap_or(constants::DEFAULT_MODRINTH_LOADER)
            .to_ascii_lowercase()
    }

    /// Versions endpoint, filtered server-side by loader and game versions.
    /// Both filters are JSON arrays in the query string.
    fn versions_url(&self, project: &str, loader: &str, game_versions: &[String]) -> String {
        let loaders = serde_json::Value::from(vec![loader.to_string()]).to_string();
        let mut url = format!(
            "{}/project/{}/version?loaders={}",
            self.api_base,
            urlencoding::encode(project),
            urlencoding::encode(&loaders)
        );

        if !game_versions.is_empty() {
            let game_versions = serde_json::Value::from(game_versions.to_vec()).to_string();
            url.push_str("&game_versions=");
            url.push_str(&urlencoding::encode(&game_versions));
        }

        url
    }
}

#[async_trait]
impl PluginSource for ModrinthSource {
    fn identifier(&self) -> &'static str {
        SOURCE_MODRINTH
    }

    fn validate(&self, request: &PluginRequest) -> Result<(), ResolveError> {
        Self::project(request).map(|_| ())
    }

    async fn resolve(
        &self,
        request: &PluginRequest,
        ctx: &ResolveContext,
    ) -> Result<ResolvedArtifact, ResolveError> {
        let project = Self::project(request)?;
        let loader = Self::loader(request);

        let url = self.versions_url(project, &loader, &request.game_versions);
        let versions: Vec<Version> = http::fetch_json(&*self.transport, ctx, &url).await?;
        debug!("Modrinth '{}': {} versions for {}", project, versions.len(), loader);

        if versions.is_empty() {
            return Err(ResolveError::NoVersionsFound {
                source_id: SOURCE_MODRINTH.to_string(),
                project: project.to_string(),
                detail: if request.game_versions.is_empty() {
                    format!("no versions for loader {}", loader)
                } else {
                    format!(
                        "no versions for loader {} and game versions {}",
                        loader,
                        request.game_versions.join(", ")
                    )
                },
            });
        }

        let numbers: Vec<&str> = versions.iter().map(|v| v.version_number.as_str()).collect();
        let selected = version_selector::select_best_version(&numbers, &request.version)?
            .ok_or_else(|| ResolveError::NoMatchingVersion {
                source_id: SOURCE_MODRINTH.to_string(),
                project: project.to_string(),
                constraint: request.version.clone(),
            })?;

        let version = versions
            .iter()
            .find(|v| v.version_number == selected)
            .ok_or_else(|| ResolveError::upstream(&url, "selected version missing from listing"))?;
        let file = version.primary_file().ok_or_else(|| {
            ResolveError::upstream(
                &url,
                format!("version '{}' lists no files", version.version_number),
            )
        })?;

        info!("Resolved modrinth:{} -> {} ({})", project, version.version_number, loader);

        let mut artifact = ResolvedArtifact::new(
            SOURCE_MODRINTH,
            &version.version_number,
            Locator::Url(file.url.clone()),
        );
        artifact.project = Some(project.to_string());
        artifact.loader = Some(loader);
        artifact.hashes = hash::collect_hashes([
            (HashAlgorithm::Sha512, file.hashes.sha512.as_deref()),
            (HashAlgorithm::Sha256, file.hashes.sha256.as_deref()),
        ]);
        Ok(artifact)
    }
}
