// Object storage (S3) source: synthesizes a storage URI, no remote discovery

use crate::constants::{LATEST, SOURCE_S3, VERSION_PLACEHOLDER};
use crate::error::ResolveError;
use crate::sources::context::ResolveContext;
use crate::sources::source_trait::{Locator, PluginRequest, PluginSource, ResolvedArtifact};
use async_trait::async_trait;
use log::debug;

#[derive(Debug, Default)]
pub struct S3Source;

impl S3Source {
    fn bucket_and_key(request: &PluginRequest) -> Result<(&str, &str), ResolveError> {
        let bucket = PluginRequest::non_empty(&request.bucket)
            .ok_or_else(|| ResolveError::missing_field(SOURCE_S3, "bucket"))?;
        let key = PluginRequest::non_empty(&request.key)
            .ok_or_else(|| ResolveError::missing_field(SOURCE_S3, "key"))?;
        Ok((bucket, key.trim_start_matches('/')))
    }

    /// Substitute `${version}` in the key template.
    ///
    /// A placeholder needs a concrete version; `latest` cannot name an object.
    fn expand_key(key: &str, version: &str) -> Result<String, ResolveError> {
        if !key.contains(VERSION_PLACEHOLDER) {
            return Ok(key.to_string());
        }
        if version == LATEST {
            return Err(ResolveError::AmbiguousVersion {
                key: key.to_string(),
            });
        }
        Ok(key.replace(VERSION_PLACEHOLDER, version))
    }
}

#[async_trait]
impl PluginSource for S3Source {
    fn identifier(&self) -> &'static str {
        SOURCE_S3
    }

    fn validate(&self, request: &PluginRequest) -> Result<(), ResolveError> {
        Self::bucket_and_key(request).map(|_| ())
    }

    async fn resolve(
        &self,
        request: &PluginRequest,
        _ctx: &ResolveContext,
    ) -> Result<ResolvedArtifact, ResolveError> {
        let (bucket, key) = Self::bucket_and_key(request)?;

        let version = match request.version.trim() {
            "" => LATEST,
            v => v,
        };
        let key = Self::expand_key(key, version)?;
        let uri = format!("s3://{}/{}", bucket, key);
        debug!("Resolved s3 object {}", uri);

        let mut artifact = ResolvedArtifact::new(SOURCE_S3, version, Locator::StorageUri(uri));
        artifact.project = request.project.clone();
        Ok(artifact)
    }
}
