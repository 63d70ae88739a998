//! In-process emulator of the Drive v2 REST API.
//!
//! Client code is pointed at a [`TestbedHttp`] instead of a network transport.
//! Requests are routed through the discovery document onto an in-memory
//! [`Directory`] of files, permissions and parent references, and answered
//! with the same JSON payloads and error envelopes the real service sends.

pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod id;
pub mod model;
pub mod router;
pub mod services;

pub use config::{DiscoverySource, Session, TestbedConfig, DEFAULT_USER_EMAIL};
pub use directory::{Directory, DirectoryHandle};
pub use error::{ApiError, HttpError, ResourceKind};
pub use http::{HttpResponse, TestbedHttp};
pub use router::Router;
