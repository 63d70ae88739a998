//! Transport shim: the object client code uses in place of an HTTP client.
//!
//! [`TestbedHttp::request`] takes what an HTTP client would send (URI, verb,
//! optional body) and answers with a status, reason phrase and JSON text,
//! exactly as the service would. Nothing leaves the process.

use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::config::{DiscoverySource, TestbedConfig, DEFAULT_USER_EMAIL};
use crate::directory::{Directory, DirectoryHandle};
use crate::error::{ApiError, HttpError, Result};
use crate::router::Router;

/// Requests whose path contains this segment get the discovery document.
pub const DISCOVERY_SEGMENT: &str = "discovery";

const RELATIVE_BASE: &str = "http://localhost/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    fn ok(body: String) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body,
        }
    }

    fn from_error(err: &ApiError) -> Self {
        Self {
            status: err.status(),
            reason: err.reason().to_string(),
            body: serde_json::to_string(&err.envelope()).unwrap_or_default(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Clone, Debug)]
pub struct TestbedHttp {
    directory: DirectoryHandle,
    discovery: DiscoverySource,
    router: Arc<OnceCell<Router>>,
}

impl Default for TestbedHttp {
    fn default() -> Self {
        Self::with_directory(
            DirectoryHandle::new(Directory::new(DEFAULT_USER_EMAIL)),
            DiscoverySource::Bundled,
        )
    }
}

impl TestbedHttp {
    pub fn new(config: TestbedConfig) -> Result<Self> {
        let directory = config.directory_handle()?;
        Ok(Self::with_directory(directory, config.discovery))
    }

    /// A transport over an existing directory. The discovery document is
    /// loaded on the first request.
    pub fn with_directory(directory: DirectoryHandle, discovery: DiscoverySource) -> Self {
        Self {
            directory,
            discovery,
            router: Arc::new(OnceCell::new()),
        }
    }

    /// A transport with an already-built router.
    pub fn with_router(directory: DirectoryHandle, router: Router) -> Self {
        Self {
            directory,
            discovery: DiscoverySource::Bundled,
            router: Arc::new(OnceCell::with_value(router)),
        }
    }

    pub fn directory(&self) -> &DirectoryHandle {
        &self.directory
    }

    /// The router, loading the discovery document on first use.
    pub fn router(&self) -> Result<&Router> {
        self.router.get_or_try_init(|| Router::load(&self.discovery))
    }

    /// Answer one request. Failures are encoded in the response, never raised.
    pub fn request(&self, uri: &str, method: &str, body: Option<&str>) -> HttpResponse {
        let method = method.to_ascii_uppercase();
        let response = match self.dispatch(uri, &method, body) {
            Ok(body) => HttpResponse::ok(body),
            Err(err) => HttpResponse::from_error(&err),
        };
        tracing::debug!(%method, uri, status = response.status, "testbed request");
        response
    }

    fn dispatch(&self, uri: &str, method: &str, body: Option<&str>) -> Result<String> {
        let url = parse_uri(uri).ok_or_else(|| ApiError::NoRoute {
            method: method.to_string(),
            path: uri.to_string(),
        })?;
        let router = self.router()?;
        if url.path().contains(DISCOVERY_SEGMENT) {
            return Ok(router.discovery().raw().to_string());
        }
        let reply = {
            let mut directory = self.directory.lock();
            router.handle(
                &mut directory,
                method,
                url.path(),
                url.query().unwrap_or_default(),
                body,
            )?
        };
        serde_json::to_string(&reply).map_err(ApiError::Encode)
    }

    /// Send a JSON request and decode the reply, turning any non-2xx status
    /// into an [`HttpError`] that carries the error envelope.
    pub fn execute(
        &self,
        method: &str,
        uri: &str,
        body: Option<&Value>,
    ) -> std::result::Result<Value, HttpError> {
        let raw = body.map(Value::to_string);
        let response = self.request(uri, method, raw.as_deref());
        if !response.is_success() {
            return Err(HttpError {
                status: response.status,
                reason: response.reason,
                content: response.body,
            });
        }
        response.json().map_err(|err| HttpError {
            status: response.status,
            reason: format!("undecodable response: {err}"),
            content: response.body.clone(),
        })
    }
}

fn parse_uri(uri: &str) -> Option<Url> {
    match Url::parse(uri) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).ok()?.join(uri).ok()
        }
        Err(_) => None,
    }
}
