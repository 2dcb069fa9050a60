// Error types for plugin resolution

use thiserror::Error;

/// Everything that can go wrong while resolving a single plugin request.
///
/// Failures are scoped to one request: the orchestration layer decides
/// whether any of these is fatal for a batch.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown source '{name}' (registered: {})", available.join(", "))]
    UnknownSource { name: String, available: Vec<String> },

    #[error("no versions found for '{project}' on {source_id} ({detail})")]
    NoVersionsFound {
        source_id: String,
        project: String,
        detail: String,
    },

    #[error("no version of '{project}' on {source_id} matches constraint '{constraint}'")]
    NoMatchingVersion {
        source_id: String,
        project: String,
        constraint: String,
    },

    #[error("invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error("unparseable version '{version}'")]
    Unparseable { version: String },

    #[error("{source_id} source requires the '{field}' field")]
    MissingField {
        source_id: String,
        field: &'static str,
    },

    #[error(
        "storage key '{key}' contains a version placeholder but no explicit version was given"
    )]
    AmbiguousVersion { key: String },

    #[error("upstream API error for {url}: {message}")]
    UpstreamApi { url: String, message: String },

    #[error("resolution cancelled")]
    Cancelled,

    #[error("resolution timed out")]
    TimedOut,
}

impl ResolveError {
    /// True for failures caused by the caller's cancellation or deadline
    /// rather than by the remote registry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ResolveError::Cancelled | ResolveError::TimedOut)
    }

    pub(crate) fn upstream(url: &str, message: impl Into<String>) -> Self {
        ResolveError::UpstreamApi {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_field(source_id: &str, field: &'static str) -> Self {
        ResolveError::MissingField {
            source_id: source_id.to_string(),
            field,
        }
    }
}
