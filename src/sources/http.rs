// Shared HTTP transport used by the registry-backed sources

use crate::config::ResolverConfig;
use crate::constants;
use crate::error::ResolveError;
use crate::sources::context::ResolveContext;
use anyhow::Context;
use log::debug;
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Minimal GET-only transport the adapters talk through.
///
/// Abstracted so adapter logic can be driven by canned responses.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the response body of a successful response.
    async fn get(&self, url: &str) -> Result<String, ResolveError>;
}

lazy_static::lazy_static! {
    /// Shared transport with the default User-Agent and timeout
    static ref SHARED: Arc<HttpTransport> = Arc::new(
        HttpTransport::build(constants::USER_AGENT, Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS))
            .expect("Failed to create HTTP client")
    );
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ResolverConfig) -> anyhow::Result<Self> {
        Self::build(&config.user_agent, config.timeout())
            .with_context(|| format!("building HTTP client (user agent '{}')", config.user_agent))
    }

    /// Process-wide transport with default settings
    pub fn shared() -> Arc<HttpTransport> {
        Arc::clone(&SHARED)
    }

    fn build(user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, ResolveError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolveError::TimedOut
                } else {
                    ResolveError::upstream(url, e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolveError::upstream(url, "resource not found (404)"));
        }
        if !status.is_success() {
            return Err(ResolveError::upstream(
                url,
                format!("HTTP request failed ({})", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ResolveError::upstream(url, format!("reading body: {}", e)))
    }
}

/// Fetch JSON from a URL through `transport` and deserialize it,
/// honouring the context's cancellation and deadline.
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    ctx: &ResolveContext,
    url: &str,
) -> Result<T, ResolveError> {
    debug!("GET {}", url);
    let body = ctx.run(transport.get(url)).await?;
    serde_json::from_str(&body)
        .map_err(|e| ResolveError::upstream(url, format!("malformed response body: {}", e)))
}

/// Percent-encode each segment of a slash-separated identifier,
/// keeping the slashes (e.g. Hangar's "Owner/Project").
pub fn encode_path(id: &str) -> String {
    id.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
