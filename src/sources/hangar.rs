// Hangar source implementation (PaperMC plugin repository)

use crate::constants::{self, SOURCE_HANGAR};
use crate::error::ResolveError;
use crate::sources::context::ResolveContext;
use crate::sources::hash::{self, HashAlgorithm};
use crate::sources::http::{self, Transport};
use crate::sources::source_trait::{Locator, PluginRequest, PluginSource, ResolvedArtifact};
use crate::sources::version_selector;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct VersionsPage {
    #[serde(default)]
    pagination: Option<Pagination>,
    result: Vec<Version>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    count: u64,
}

impl VersionsPage {
    /// Versions the server reports beyond this page
    fn omitted(&self) -> u64 {
        self.pagination
            .as_ref()
            .map_or(0, |p| p.count.saturating_sub(self.result.len() as u64))
    }
}

#[derive(Debug, Deserialize)]
struct Version {
    name: String,
    /// Keyed by platform tag (PAPER, VELOCITY, WATERFALL)
    #[serde(default)]
    downloads: HashMap<String, Download>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Download {
    #[serde(default)]
    file_info: Option<FileInfo>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    external_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    #[serde(rename = "sha256Hash", default)]
    sha256_hash: Option<String>,
}

impl Download {
    /// Hosted download URL, falling back to the external one
    fn locator(&self) -> Option<&str> {
        [&self.download_url, &self.external_url]
            .into_iter()
            .find_map(PluginRequest::non_empty)
    }

    fn sha256(&self) -> Option<&str> {
        self.file_info.as_ref()?.sha256_hash.as_deref()
    }
}

pub struct HangarSource {
    transport: Arc<dyn Transport>,
    api_base: String,
}

impl HangarSource {
    pub fn new(transport: Arc<dyn Transport>, api_base: impl Into<String>) -> Self {
        Self {
            transport,
            api_base: api_base.into(),
        }
    }

    fn platform(request: &PluginRequest) -> String {
        PluginRequest::non_empty(&request.platform)
            .unwrap_or(constants::DEFAULT_HANGAR_PLATFORM)
            .to_ascii_uppercase()
    }

    fn project(request: &PluginRequest) -> Result<&str, ResolveError> {
        PluginRequest::non_empty(&request.project)
            .ok_or_else(|| ResolveError::missing_field(SOURCE_HANGAR, "project"))
    }

    fn versions_url(&self, project: &str) -> String {
        format!(
            "{}/projects/{}/versions?limit={}&offset=0",
            self.api_base,
            http::encode_path(project),
            constants::HANGAR_PAGE_LIMIT
        )
    }
}

#[async_trait]
impl PluginSource for HangarSource {
    fn identifier(&self) -> &'static str {
        SOURCE_HANGAR
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
        let platform = Self::platform(request);

        let url = self.versions_url(project);
        let page: VersionsPage = http::fetch_json(&*self.transport, ctx, &url).await?;

        // Only one page is fetched; make truncation visible
        let omitted = page.omitted();
        if omitted > 0 {
            warn!(
                "Hangar project '{}': only the newest {} versions were considered, {} older ones omitted",
                project,
                page.result.len(),
                omitted
            );
        }

        let available: Vec<(&Version, &Download)> = page
            .result
            .iter()
            .filter_map(|v| {
                v.downloads
                    .get(&platform)
                    .filter(|d| d.locator().is_some())
                    .map(|d| (v, d))
            })
            .collect();

        debug!(
            "Hangar '{}': {} of {} versions available on {}",
            project,
            available.len(),
            page.result.len(),
            platform
        );

        if available.is_empty() {
            return Err(ResolveError::NoVersionsFound {
                source_id: SOURCE_HANGAR.to_string(),
                project: project.to_string(),
                detail: format!("no downloads for platform {}", platform),
            });
        }

        let names: Vec<&str> = available.iter().map(|(v, _)| v.name.as_str()).collect();
        let selected = version_selector::select_best_version(&names, &request.version)?
            .ok_or_else(|| ResolveError::NoMatchingVersion {
                source_id: SOURCE_HANGAR.to_string(),
                project: project.to_string(),
                constraint: request.version.clone(),
            })?;

        let (version, download) = available
            .iter()
            .find(|(v, _)| v.name == selected)
            .ok_or_else(|| ResolveError::upstream(&url, "selected version missing from listing"))?;
        let locator = download
            .locator()
            .ok_or_else(|| ResolveError::upstream(&url, "download has no URL"))?;

        info!("Resolved hangar:{} -> {} ({})", project, version.name, platform);

        let mut artifact =
            ResolvedArtifact::new(SOURCE_HANGAR, &version.name, Locator::Url(locator.to_string()));
        artifact.project = Some(project.to_string());
        artifact.platform = Some(platform);
        artifact.hashes = hash::collect_hashes([(HashAlgorithm::Sha256, download.sha256())]);
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::http::testing::FakeTransport;
    use serde_json::json;

    const BASE: &str = "http://hangar.test/api/v1";
    const SHA: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    fn versions_url(project: &str) -> String {
        format!("{}/projects/{}/versions?limit=100&offset=0", BASE, project)
    }

    fn download(url: &str) -> serde_json::Value {
        json!({
            "fileInfo": {"name": "plugin.jar", "sizeBytes": 10, "sha256Hash": SHA},
            "externalUrl": null,
            "downloadUrl": url
        })
    }

    fn source(transport: FakeTransport) -> HangarSource {
        HangarSource::new(Arc::new(transport), BASE)
    }

    fn tab_listing() -> serde_json::Value {
        json!({
            "pagination": {"count": 3, "limit": 100, "offset": 0},
            "result": [
                {"name": "5.0.1", "downloads": {"PAPER": download("https://cdn/paper-5.0.1.jar")}},
                {"name": "5.0.0", "downloads": {
                    "PAPER": download("https://cdn/paper-5.0.0.jar"),
                    "VELOCITY": download("https://cdn/velocity-5.0.0.jar")
                }},
                {"name": "4.9.9", "downloads": {"VELOCITY": download("https://cdn/velocity-4.9.9.jar")}}
            ]
        })
    }

    #[tokio::test]
    async fn test_resolves_newest_for_default_platform() {
        let transport = FakeTransport::new().json(&versions_url("NEZNAMY/TAB"), tab_listing());
        let artifact = source(transport)
            .resolve(&PluginRequest::new("hangar").project("NEZNAMY/TAB"), &ResolveContext::new())
            .await
            .unwrap();

        assert_eq!(artifact.version, "5.0.0");
        assert_eq!(artifact.platform.as_deref(), Some("VELOCITY"));
        assert_eq!(artifact.url(), Some("https://cdn/velocity-5.0.0.jar"));
        assert_eq!(artifact.hash(HashAlgorithm::Sha256), Some(SHA));
        assert_eq!(artifact.project.as_deref(), Some("NEZNAMY/TAB"));
    }

    #[tokio::test]
    async fn test_version_without_platform_download_is_excluded() {
        // 5.0.1 satisfies the constraint but only ships for PAPER
        let transport = FakeTransport::new().json(&versions_url("NEZNAMY/TAB"), tab_listing());
        let request = PluginRequest::new("hangar")
            .project("NEZNAMY/TAB")
            .version(">=5.0.0")
            .platform("velocity");
        let artifact = source(transport)
            .resolve(&request, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(artifact.version, "5.0.0");
    }

    #[tokio::test]
    async fn test_explicit_platform() {
        let transport = FakeTransport::new().json(&versions_url("NEZNAMY/TAB"), tab_listing());
        let request = PluginRequest::new("hangar")
            .project("NEZNAMY/TAB")
            .platform("PAPER");
        let artifact = source(transport)
            .resolve(&request, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(artifact.version, "5.0.1");
        assert_eq!(artifact.url(), Some("https://cdn/paper-5.0.1.jar"));
    }

    #[tokio::test]
    async fn test_no_versions_for_platform() {
        let transport = FakeTransport::new().json(&versions_url("NEZNAMY/TAB"), tab_listing());
        let request = PluginRequest::new("hangar")
            .project("NEZNAMY/TAB")
            .platform("WATERFALL");
        let err = source(transport)
            .resolve(&request, &ResolveContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoVersionsFound { .. }));
    }

    #[tokio::test]
    async fn test_no_matching_version() {
        let transport = FakeTransport::new().json(&versions_url("NEZNAMY/TAB"), tab_listing());
        let request = PluginRequest::new("hangar")
            .project("NEZNAMY/TAB")
            .version("~6.0");
        let err = source(transport)
            .resolve(&request, &ResolveContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingVersion { .. }));
    }

    #[tokio::test]
    async fn test_external_download_without_file_info() {
        let listing = json!({
            "result": [{"name": "1.2.0", "downloads": {"VELOCITY": {
                "fileInfo": null,
                "externalUrl": "https://github.com/o/r/releases/x.jar",
                "downloadUrl": null
            }}}]
        });
        let transport = FakeTransport::new().json(&versions_url("o/r"), listing);
        let artifact = source(transport)
            .resolve(&PluginRequest::new("hangar").project("o/r"), &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(artifact.url(), Some("https://github.com/o/r/releases/x.jar"));
        assert!(artifact.hashes.is_empty());
    }

    #[test]
    fn test_omitted_counts_versions_beyond_page() {
        let page: VersionsPage = serde_json::from_value(json!({
            "pagination": {"count": 250, "limit": 100, "offset": 0},
            "result": [{"name": "2.0.0", "downloads": {}}]
        }))
        .unwrap();
        assert_eq!(page.omitted(), 249);

        let page: VersionsPage = serde_json::from_value(tab_listing()).unwrap();
        assert_eq!(page.omitted(), 0);

        let page: VersionsPage = serde_json::from_value(json!({"result": []})).unwrap();
        assert_eq!(page.omitted(), 0);
    }

    #[tokio::test]
    async fn test_truncated_listing_still_resolves_from_first_page() {
        let listing = json!({
            "pagination": {"count": 250, "limit": 100, "offset": 0},
            "result": [
                {"name": "2.0.0", "downloads": {"VELOCITY": download("https://cdn/velocity-2.0.0.jar")}}
            ]
        });
        let transport = FakeTransport::new().json(&versions_url("big/project"), listing);
        let artifact = source(transport)
            .resolve(
                &PluginRequest::new("hangar").project("big/project"),
                &ResolveContext::new(),
            )
            .await
            .unwrap();
        assert_eq!(artifact.version, "2.0.0");
        assert_eq!(artifact.url(), Some("https://cdn/velocity-2.0.0.jar"));
    }

    #[tokio::test]
    async fn test_missing_project() {
        let err = source(FakeTransport::new())
            .resolve(&PluginRequest::new("hangar"), &ResolveContext::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingField { field: "project", .. }
        ));
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let transport =
            FakeTransport::new().failing(&versions_url("NEZNAMY/TAB"), "HTTP request failed (500)");
        let err = source(transport)
            .resolve(&PluginRequest::new("hangar").project("NEZNAMY/TAB"), &ResolveContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::UpstreamApi { .. }));
    }
}
