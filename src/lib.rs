//! Plugin resolution core for Minecraft servers.
//!
//! Turns a [`PluginRequest`] into exactly one [`ResolvedArtifact`] by asking
//! the matching source (Hangar, Modrinth, PaperMC, S3 or a direct URL) and
//! applying the version constraint language in
//! [`sources::version_matcher`].
//!
//! ```no_run
//! use scaf::{PluginRequest, ResolveContext, SourceRegistry};
//!
//! # async fn run() -> Result<(), scaf::ResolveError> {
//! let registry = SourceRegistry::new();
//! let request = PluginRequest::new("hangar").project("NEZNAMY/TAB").version(">=5.0.0");
//! let artifact = registry.resolve("hangar", &request, &ResolveContext::new()).await?;
//! println!("{} {}", artifact.version, artifact.locator.as_str());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod sources;

pub use config::ResolverConfig;
pub use error::ResolveError;
pub use sources::hash::HashAlgorithm;
pub use sources::version_selector::{filter_versions, select_best_version};
pub use sources::version_matcher::{Constraint, parse_constraint, parse_version};
pub use sources::{
    Locator, PluginRequest, PluginSource, ResolveContext, ResolvedArtifact, SourceRegistry,
    Transport,
};
