// Manifest module: loads plugins.yaml into plugin requests

use anyhow::Context;
use scaf::PluginRequest;
use scaf::constants::{LATEST, SOURCE_PAPERMC};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub velocity: Option<Component>,
    #[serde(default)]
    pub paper: Option<Component>,
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginRequest>,
}

/// Server or proxy software resolved through the PaperMC API
#[derive(Debug, Default, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub version: String,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Manifest not found at {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Named requests: the velocity/paper components first, then plugins
    /// in name order.
    pub fn requests(&self) -> Vec<(String, PluginRequest)> {
        let components = [("velocity", &self.velocity), ("paper", &self.paper)];

        components
            .into_iter()
            .filter_map(|(name, component)| {
                component.as_ref().map(|c| {
                    let version = if c.version.trim().is_empty() {
                        LATEST
                    } else {
                        c.version.as_str()
                    };
                    (
                        name.to_string(),
                        PluginRequest::new(SOURCE_PAPERMC)
                            .project(name)
                            .version(version),
                    )
                })
            })
            .chain(
                self.plugins
                    .iter()
                    .map(|(name, request)| (name.clone(), request.clone())),
            )
            .collect()
    }
}
