// PaperMC API source implementation (Velocity, Paper, Waterfall builds)

use crate::constants::{self, SOURCE_PAPERMC};
use crate::error::ResolveError;
use crate::sources::context::ResolveContext;
use crate::sources::http::{self, Transport};
use crate::sources::source_trait::{Locator, PluginRequest, PluginSource, ResolvedArtifact};
use crate::sources::version_selector;
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Project {
    /// Oldest first
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Builds {
    builds: Vec<Build>,
}

#[derive(Debug, Deserialize)]
struct Build {
    build: u64,
    #[serde(default)]
    downloads: Downloads,
}

#[derive(Debug, Default, Deserialize)]
struct Downloads {
    application: Option<Application>,
}

#[derive(Debug, Deserialize)]
struct Application {
    name: String,
}

pub struct PaperMcSource {
    transport: Arc<dyn Transport>,
    api_base: String,
}

impl PaperMcSource {
    pub fn new(transport: Arc<dyn Transport>, api_base: impl Into<String>) -> Self {
        Self {
            transport,
            api_base: api_base.into(),
        }
    }

    fn project(request: &PluginRequest) -> &str {
        PluginRequest::non_empty(&request.project).unwrap_or(constants::DEFAULT_PAPERMC_PROJECT)
    }

    /// Version names, newest first
    async fn fetch_versions(
        &self,
        project: &str,
        ctx: &ResolveContext,
    ) -> Result<Vec<String>, ResolveError> {
        let url = format!("{}/projects/{}", self.api_base, urlencoding::encode(project));
        let mut data: Project = http::fetch_json(&*self.transport, ctx, &url).await?;
        data.versions.reverse();
        Ok(data.versions)
    }

    /// Newest build of `version` and its application file name.
    ///
    /// The builds endpoint has no "latest" marker and its ordering is not
    /// documented, so the highest build number wins rather than the last
    /// element.
    async fn fetch_latest_build(
        &self,
        project: &str,
        version: &str,
        ctx: &ResolveContext,
    ) -> Result<(u64, String), ResolveError> {
        let url = format!(
            "{}/projects/{}/versions/{}/builds",
            self.api_base,
            urlencoding::encode(project),
            urlencoding::encode(version)
        );
        let data: Builds = http::fetch_json(&*self.transport, ctx, &url).await?;

        let latest = data.builds.iter().max_by_key(|b| b.build).ok_or_else(|| {
            ResolveError::NoVersionsFound {
                source_id: SOURCE_PAPERMC.to_string(),
                project: project.to_string(),
                detail: format!("no builds for version {}", version),
            }
        })?;

        let application = latest.downloads.application.as_ref().ok_or_else(|| {
            ResolveError::upstream(
                &url,
                format!("build {} has no application download", latest.build),
            )
        })?;

        Ok((latest.build, application.name.clone()))
    }

    fn download_url(&self, project: &str, version: &str, build: u64, file: &str) -> String {
        format!(
            "{}/projects/{}/versions/{}/builds/{}/downloads/{}",
            self.api_base,
            urlencoding::encode(project),
            urlencoding::encode(version),
            build,
            urlencoding::encode(file)
        )
    }
}

#[async_trait]
impl PluginSource for PaperMcSource {
    fn identifier(&self) -> &'static str {
        SOURCE_PAPERMC
    }

    async fn resolve(
        &self,
        request: &PluginRequest,
        ctx: &ResolveContext,
    ) -> Result<ResolvedArtifact, ResolveError> {
        let project = Self::project(request);

        let versions = self.fetch_versions(project, ctx).await?;
        debug!("PaperMC '{}': {} versions", project, versions.len());
        if versions.is_empty() {
            return Err(ResolveError::NoVersionsFound {
                source_id: SOURCE_PAPERMC.to_string(),
                project: project.to_string(),
                detail: "project lists no versions".into(),
            });
        }

        let selected = version_selector::select_best_version(&versions, &request.version)?
            .ok_or_else(|| ResolveError::NoMatchingVersion {
                source_id: SOURCE_PAPERMC.to_string(),
                project: project.to_string(),
                constraint: request.version.clone(),
            })?;

        let (build, file) = self.fetch_latest_build(project, &selected, ctx).await?;
        info!("Resolved papermc:{} -> {} build {}", project, selected, build);

        let url = self.download_url(project, &selected, build, &file);
        let mut artifact = ResolvedArtifact::new(SOURCE_PAPERMC, selected, Locator::Url(url));
        artifact.project = Some(project.to_string());
        artifact.build = Some(build);
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::http::testing::FakeTransport;
    use serde_json::json;

    const BASE: &str = "http://papermc.test/v2";

    fn build(number: u64, project: &str, version: &str) -> serde_json::Value {
        json!({
            "build": number,
            "channel": "default",
            "downloads": {"application": {
                "name": format!("{}-{}-{}.jar", project, version, number),
                "sha256": "00"
            }}
        })
    }

    fn velocity_transport() -> FakeTransport {
        FakeTransport::new()
            .json(
                &format!("{}/projects/velocity", BASE),
                json!({"project_id": "velocity", "versions": ["3.2.0-SNAPSHOT", "3.3.0-SNAPSHOT", "3.4.0-SNAPSHOT"]}),
            )
            .json(
                &format!("{}/projects/velocity/versions/3.4.0-SNAPSHOT/builds", BASE),
                json!({"builds": [
                    build(430, "velocity", "3.4.0-SNAPSHOT"),
                    build(436, "velocity", "3.4.0-SNAPSHOT"),
                    build(433, "velocity", "3.4.0-SNAPSHOT")
                ]}),
            )
            .json(
                &format!("{}/projects/velocity/versions/3.3.0-SNAPSHOT/builds", BASE),
                json!({"builds": [build(400, "velocity", "3.3.0-SNAPSHOT")]}),
            )
    }

    fn source(transport: FakeTransport) -> PaperMcSource {
        PaperMcSource::new(Arc::new(transport), BASE)
    }

    #[tokio::test]
    async fn test_latest_is_last_listed_version_and_highest_build() {
        let artifact = source(velocity_transport())
            .resolve(&PluginRequest::new("papermc"), &ResolveContext::new())
            .await
            .unwrap();

        assert_eq!(artifact.project.as_deref(), Some("velocity"));
        assert_eq!(artifact.version, "3.4.0-SNAPSHOT");
        assert_eq!(artifact.build, Some(436));
        assert_eq!(
            artifact.url(),
            Some("http://papermc.test/v2/projects/velocity/versions/3.4.0-SNAPSHOT/builds/436/downloads/velocity-3.4.0-SNAPSHOT-436.jar")
        );
        assert!(artifact.hashes.is_empty());
    }

    #[tokio::test]
    async fn test_constraint_with_prerelease_marker() {
        let request = PluginRequest::new("papermc").version("~3.3.0-0");
        let artifact = source(velocity_transport())
            .resolve(&request, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(artifact.version, "3.3.0-SNAPSHOT");
        assert_eq!(artifact.build, Some(400));
    }

    #[tokio::test]
    async fn test_snapshots_need_marker() {
        let request = PluginRequest::new("papermc").version("~3.3");
        let err = source(velocity_transport())
            .resolve(&request, &ResolveContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingVersion { .. }));
    }

    #[tokio::test]
    async fn test_no_builds() {
        let transport = FakeTransport::new()
            .json(&format!("{}/projects/paper", BASE), json!({"versions": ["1.21.4"]}))
            .json(
                &format!("{}/projects/paper/versions/1.21.4/builds", BASE),
                json!({"builds": []}),
            );
        let err = source(transport)
            .resolve(&PluginRequest::new("papermc").project("paper"), &ResolveContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoVersionsFound { .. }));
    }

    #[tokio::test]
    async fn test_no_versions() {
        let transport =
            FakeTransport::new().json(&format!("{}/projects/folia", BASE), json!({"versions": []}));
        let err = source(transport)
            .resolve(&PluginRequest::new("papermc").project("folia"), &ResolveContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoVersionsFound { .. }));
    }

    #[tokio::test]
    async fn test_build_fetch_honours_cancellation() {
        let ctx = ResolveContext::new();
        ctx.cancel();
        let err = source(velocity_transport())
            .resolve(&PluginRequest::new("papermc"), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_cancellation());
    }
}
