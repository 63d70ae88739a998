//! Command line and environment configuration for the testbed server.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use drive_testbed_core::{DiscoverySource, TestbedConfig, DEFAULT_USER_EMAIL};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "drive-testbed")]
#[command(about = "In-process Drive v2 emulator served over HTTP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the emulated API
    Serve {
        /// Listen address
        #[arg(short, long, default_value = "127.0.0.1:8080", env = "DRIVE_TESTBED_ADDR")]
        addr: SocketAddr,

        #[command(flatten)]
        testbed: TestbedArgs,
    },

    /// Print the routes derived from the discovery document
    Routes {
        /// Discovery document to read instead of the bundled one
        #[arg(long, env = "DRIVE_TESTBED_DISCOVERY")]
        discovery: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TestbedArgs {
    /// Email of the authenticated user that owns new files
    #[arg(long, default_value = DEFAULT_USER_EMAIL, env = "DRIVE_TESTBED_USER_EMAIL")]
    pub user_email: String,

    /// JSON file holding an array of file resources to start with
    #[arg(long, env = "DRIVE_TESTBED_SEED")]
    pub seed: Option<PathBuf>,

    /// Discovery document to read instead of the bundled one
    #[arg(long, env = "DRIVE_TESTBED_DISCOVERY")]
    pub discovery: Option<PathBuf>,
}

impl TestbedArgs {
    pub fn load_config(&self) -> Result<TestbedConfig> {
        let files = match &self.seed {
            Some(path) => load_seed(path)?,
            None => Vec::new(),
        };
        Ok(TestbedConfig::new()
            .with_user_email(self.user_email.clone())
            .with_files(files)
            .with_discovery(discovery_source(self.discovery.clone())))
    }
}

pub fn discovery_source(path: Option<PathBuf>) -> DiscoverySource {
    path.map_or(DiscoverySource::Bundled, DiscoverySource::File)
}

/// Read a seed file: a JSON array of file resources.
pub fn load_seed(path: &Path) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;
    match value {
        Value::Array(files) => Ok(files),
        _ => bail!("seed file {} must hold a JSON array", path.display()),
    }
}
