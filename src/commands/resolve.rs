// Resolve command: resolves every manifest entry independently

use crate::manifest::Manifest;
use crate::ui;
use anyhow::Context;
use futures::future::join_all;
use log::{debug, info};
use scaf::constants::DEFAULT_CONFIG_FILE;
use scaf::{PluginRequest, ResolveContext, ResolvedArtifact, ResolverConfig, SourceRegistry};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub struct ResolveOptions {
    pub manifest: PathBuf,
    pub config: Option<PathBuf>,
    pub timeout: Option<u64>,
}

pub async fn resolve(options: ResolveOptions) -> anyhow::Result<i32> {
    let config = match &options.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
    }
    .with_env()?;
    debug!("Resolver config: {:?}", config);

    let manifest = Manifest::load(&options.manifest)?;
    let requests = manifest.requests();
    if requests.is_empty() {
        ui::warning("Manifest declares no plugins");
        ui::print_yaml(&BTreeMap::<String, ResolvedArtifact>::new())?;
        return Ok(0);
    }

    let registry = SourceRegistry::with_config(&config)?;
    let timeout = Duration::from_secs(options.timeout.unwrap_or(config.timeout_secs));
    let ctx = ResolveContext::with_timeout(timeout);

    // Ctrl-C cancels whatever is still in flight
    let interrupt = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctx.cancel();
            }
        })
    };

    let spinner = ui::spinner(&format!("Resolving {} plugin(s)...", requests.len()));
    let outcomes = resolve_all(&registry, &requests, &ctx).await;
    spinner.finish_and_clear();
    interrupt.abort();

    if ctx.is_cancelled() {
        ui::warning("Interrupted; unfinished plugins were cancelled");
    }

    let mut resolved = BTreeMap::new();
    let mut failed = 0;
    for (name, outcome) in outcomes {
        match outcome {
            Ok(artifact) => {
                ui::resolved(name, &artifact);
                resolved.insert(name.to_string(), artifact);
            }
            Err(e) => {
                ui::failed(name, &e);
                failed += 1;
            }
        }
    }

    ui::summary(resolved.len(), failed);
    ui::print_yaml(&resolved)?;

    // Exit codes:
    // 0 = every plugin resolved
    // 1 = at least one plugin failed
    Ok(if failed == 0 { 0 } else { 1 })
}

/// Resolve all requests concurrently. Each outcome stands alone: one
/// failure never prevents the others from resolving.
pub async fn resolve_all<'a>(
    registry: &SourceRegistry,
    requests: &'a [(String, PluginRequest)],
    ctx: &ResolveContext,
) -> Vec<(&'a str, anyhow::Result<ResolvedArtifact>)> {
    let tasks = requests.iter().map(|(name, request)| async move {
        let outcome = resolve_one(registry, request, ctx).await.with_context(|| {
            format!(
                "resolving {} ({}:{})",
                name,
                request.source,
                request.project.as_deref().unwrap_or("-")
            )
        });
        (name.as_str(), outcome)
    });

    join_all(tasks).await
}

async fn resolve_one(
    registry: &SourceRegistry,
    request: &PluginRequest,
    ctx: &ResolveContext,
) -> Result<ResolvedArtifact, scaf::ResolveError> {
    // Cheap field checks first, so a bad entry never waits on the network
    registry.get_or_error(&request.source)?.validate(request)?;

    let artifact = registry.resolve(&request.source, request, ctx).await?;
    info!("{} -> {} {}", request.source, artifact.version, artifact.locator.as_str());
    Ok(artifact)
}
