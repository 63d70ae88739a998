//! Request routing.
//!
//! A [`Router`] owns the discovery document and the [`RouteTable`] derived
//! from it. Handling a request goes:
//!
//! 1. strip the `/drive/v2/` prefix from the path,
//! 2. resolve (verb, path) to a route, binding path parameters,
//! 3. normalize the query string and decode the JSON body,
//! 4. bind everything to a typed [`Call`] and run it on the directory.

pub mod discovery;
pub mod operation;
pub mod table;

pub use discovery::{Discovery, DiscoveryDocument, BUNDLED_DISCOVERY};
pub use operation::{normalize_query, Call, Operation, Params, QueryValue, Reply};
pub use table::{PathTemplate, Route, RouteTable, Target};

use serde_json::Value;

use crate::config::DiscoverySource;
use crate::directory::Directory;
use crate::error::{ApiError, Result};

/// Path prefix separating the API version from the resource path.
pub const API_PREFIX: &str = "/drive/v2/";

#[derive(Clone, Debug)]
pub struct Router {
    discovery: Discovery,
    table: RouteTable,
}

impl Router {
    pub fn new(discovery: Discovery) -> Self {
        let table = RouteTable::from_discovery(discovery.document());
        Self { discovery, table }
    }

    pub fn load(source: &DiscoverySource) -> Result<Self> {
        Ok(Self::new(Discovery::load(source)?))
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve a request into a bound [`Call`] without running it.
    pub fn resolve(
        &self,
        method: &str,
        path: &str,
        query: &str,
        body: Option<&str>,
    ) -> Result<Call> {
        let no_route = || ApiError::NoRoute {
            method: method.to_string(),
            path: path.to_string(),
        };
        let (_, api_path) = path.split_once(API_PREFIX).ok_or_else(no_route)?;
        let (route, path_params) = self.table.resolve(method, api_path).ok_or_else(no_route)?;
        let operation = match route.target {
            Target::Operation(operation) => operation,
            Target::Unimplemented => {
                return Err(ApiError::UnknownAction {
                    resource: route.resource.clone(),
                    action: route.action.clone(),
                })
            }
        };

        let body = match body {
            Some(raw) if route.expects_body && !raw.trim().is_empty() => Some(
                serde_json::from_str::<Value>(raw).map_err(ApiError::InvalidBody)?,
            ),
            _ => None,
        };
        let params = Params {
            path: path_params,
            query: normalize_query(url::form_urlencoded::parse(query.as_bytes()).into_owned()),
            body,
        };
        tracing::debug!(
            resource = %route.resource,
            action = %route.action,
            path_params = ?params.path,
            "resolved route"
        );
        operation.bind(&params)
    }

    /// Route a request and run it against `directory`.
    pub fn handle(
        &self,
        directory: &mut Directory,
        method: &str,
        path: &str,
        query: &str,
        body: Option<&str>,
    ) -> Result<Reply> {
        let call = self
            .resolve(method, path, query, body)
            .inspect_err(|err| tracing::warn!(method, path, error = %err, "routing failed"))?;
        directory.execute(call)
    }
}
