// Direct URL source: echoes the configured URL, no reachability check

use crate::constants::{SOURCE_URL, UNKNOWN_VERSION};
use crate::error::ResolveError;
use crate::sources::context::ResolveContext;
use crate::sources::source_trait::{Locator, PluginRequest, PluginSource, ResolvedArtifact};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct UrlSource;

impl UrlSource {
    fn url(request: &PluginRequest) -> Result<&str, ResolveError> {
        PluginRequest::non_empty(&request.url)
            .ok_or_else(|| ResolveError::missing_field(SOURCE_URL, "url"))
    }
}

#[async_trait]
impl PluginSource for UrlSource {
    fn identifier(&self) -> &'static str {
        SOURCE_URL
    }

    fn validate(&self, request: &PluginRequest) -> Result<(), ResolveError> {
        Self::url(request).map(|_| ())
    }

    async fn resolve(
        &self,
        request: &PluginRequest,
        _ctx: &ResolveContext,
    ) -> Result<ResolvedArtifact, ResolveError> {
        let url = Self::url(request)?;
        let version = match request.version.trim() {
            "" => UNKNOWN_VERSION,
            v => v,
        };

        let mut artifact =
            ResolvedArtifact::new(SOURCE_URL, version, Locator::Url(url.to_string()));
        artifact.project = request.project.clone();
        Ok(artifact)
    }
}
