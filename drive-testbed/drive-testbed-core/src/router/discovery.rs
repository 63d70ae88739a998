//! The discovery document: served verbatim to clients and parsed into routes.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::DiscoverySource;

/// Drive v2 discovery document compiled into the crate.
pub const BUNDLED_DISCOVERY: &str = include_str!("drive_v2.json");

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDocument {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDoc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResourceDoc {
    #[serde(default)]
    pub methods: BTreeMap<String, MethodDoc>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDoc {
    pub path: String,
    pub http_method: String,
    /// Schema reference of the request body, present when the method takes one.
    #[serde(default)]
    pub request: Option<Value>,
}

/// A loaded discovery document together with its original text.
#[derive(Clone, Debug)]
pub struct Discovery {
    raw: String,
    document: DiscoveryDocument,
}

impl Discovery {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let document =
            serde_json::from_str(&raw).context("discovery document is not valid JSON")?;
        Ok(Self { raw, document })
    }

    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_DISCOVERY)
    }

    pub fn load(source: &DiscoverySource) -> Result<Self> {
        let discovery = match source {
            DiscoverySource::Bundled => Self::bundled()?,
            DiscoverySource::File(path) => {
                let raw = std::fs::read_to_string(path).with_context(|| {
                    format!("reading discovery document {}", path.display())
                })?;
                Self::parse(raw)
                    .with_context(|| format!("loading discovery document {}", path.display()))?
            }
        };
        tracing::info!(
            api = %discovery.document.name,
            version = %discovery.document.version,
            resources = discovery.document.resources.len(),
            "loaded discovery document"
        );
        Ok(discovery)
    }

    /// The document text exactly as it was loaded.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn document(&self) -> &DiscoveryDocument {
        &self.document
    }
}
