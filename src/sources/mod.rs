// Sources module for plugin source implementations and their registry

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::error::ResolveError;

pub mod context;
pub mod hangar;
pub mod hash;
pub mod http;
pub mod modrinth;
pub mod papermc;
pub mod s3;
pub mod source_trait;
pub mod url;
pub mod version_matcher;
pub mod version_selector;

pub use context::ResolveContext;
pub use hangar::HangarSource;
pub use http::{HttpTransport, Transport};
pub use modrinth::ModrinthSource;
pub use papermc::PaperMcSource;
pub use s3::S3Source;
pub use source_trait::{Locator, PluginRequest, PluginSource, ResolvedArtifact};
pub use url::UrlSource;

/// Registry for plugin sources
///
/// Filled once at startup; afterwards only read, so a shared reference can
/// serve concurrent resolutions.
#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn PluginSource>>,
}

impl SourceRegistry {
    /// Registry with no sources
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the five built-in sources on the default endpoints
    pub fn new() -> Self {
        Self::with_transport(&ResolverConfig::default(), HttpTransport::shared())
    }

    /// Registry with the built-in sources, built from `config`
    pub fn with_config(config: &ResolverConfig) -> anyhow::Result<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Registry with the built-in sources talking through `transport`
    pub fn with_transport(config: &ResolverConfig, transport: Arc<dyn Transport>) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(HangarSource::new(
            Arc::clone(&transport),
            &config.hangar_api,
        )));
        registry.register(Arc::new(ModrinthSource::new(
            Arc::clone(&transport),
            &config.modrinth_api,
        )));
        registry.register(Arc::new(PaperMcSource::new(transport, &config.papermc_api)));
        registry.register(Arc::new(S3Source));
        registry.register(Arc::new(UrlSource));
        registry
    }

    /// Add a source under its identifier; a later registration for the same
    /// identifier replaces the earlier one.
    pub fn register(&mut self, source: Arc<dyn PluginSource>) {
        self.sources.insert(source.identifier().to_string(), source);
    }

    pub fn get(&self, source_name: &str) -> Option<&Arc<dyn PluginSource>> {
        self.sources.get(source_name)
    }

    pub fn get_or_error(&self, source_name: &str) -> Result<&Arc<dyn PluginSource>, ResolveError> {
        self.get(source_name)
            .ok_or_else(|| ResolveError::UnknownSource {
                name: source_name.to_string(),
                available: self.sorted_sources(),
            })
    }

    /// Resolve `request` with the named source. The source's error is
    /// returned as is.
    pub async fn resolve(
        &self,
        source_name: &str,
        request: &PluginRequest,
        ctx: &ResolveContext,
    ) -> Result<ResolvedArtifact, ResolveError> {
        self.get_or_error(source_name)?.resolve(request, ctx).await
    }

    /// Registered identifiers, in no particular order
    pub fn sources(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    fn sorted_sources(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }
}
