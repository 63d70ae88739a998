//! Construction options for a testbed transport.

use serde_json::Value;
use std::path::PathBuf;

use crate::directory::{Directory, DirectoryHandle};
use crate::error::Result;

pub const DEFAULT_USER_EMAIL: &str = "user@drivetestbed.org";

/// Where the discovery document comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DiscoverySource {
    /// The Drive v2 document compiled into this crate.
    #[default]
    Bundled,
    /// A document on disk, read on the first request.
    File(PathBuf),
}

/// Which backend a transport talks to.
#[derive(Clone, Debug, Default)]
pub enum Session {
    /// A fresh directory built from the config's seed files and user.
    #[default]
    Isolated,
    /// An existing directory shared with every transport holding the handle.
    /// Seed files and user email in the config are ignored.
    Shared(DirectoryHandle),
}

#[derive(Clone, Debug)]
pub struct TestbedConfig {
    pub files: Vec<Value>,
    pub user_email: String,
    pub session: Session,
    pub discovery: DiscoverySource,
}

impl Default for TestbedConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            user_email: DEFAULT_USER_EMAIL.to_string(),
            session: Session::Isolated,
            discovery: DiscoverySource::Bundled,
        }
    }
}

impl TestbedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, files: impl IntoIterator<Item = Value>) -> Self {
        self.files = files.into_iter().collect();
        self
    }

    pub fn with_user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = email.into();
        self
    }

    pub fn shared(mut self, handle: DirectoryHandle) -> Self {
        self.session = Session::Shared(handle);
        self
    }

    pub fn with_discovery(mut self, source: DiscoverySource) -> Self {
        self.discovery = source;
        self
    }

    /// A directory seeded from this config, independent of `session`.
    pub fn build_directory(&self) -> Result<Directory> {
        Directory::with_files(&self.user_email, &self.files)
    }

    /// The handle a transport built from this config uses.
    pub fn directory_handle(&self) -> Result<DirectoryHandle> {
        match &self.session {
            Session::Isolated => Ok(DirectoryHandle::new(self.build_directory()?)),
            Session::Shared(handle) => Ok(handle.clone()),
        }
    }
}
