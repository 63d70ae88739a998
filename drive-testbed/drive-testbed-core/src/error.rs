//! Error contract of the emulator.
//!
//! Every failure a routed request can hit is an [`ApiError`]. Each variant knows
//! its HTTP status, reason phrase and the structured envelope the real service
//! would send, so the transport layer never has to guess.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of resource a lookup failed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    File,
    Permission,
    Parent,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::File => "File",
            ResourceKind::Permission => "Permission",
            ResourceKind::Parent => "Parent",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: ResourceKind, id: String },

    #[error("No route for {method} {path}")]
    NoRoute { method: String, path: String },

    #[error("Unknown action: {resource}.{action}")]
    UnknownAction { resource: String, action: String },

    #[error("Required parameter: {0}")]
    MissingParameter(String),

    #[error("Parse Error: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error(transparent)]
    Discovery(#[from] anyhow::Error),

    #[error("Response encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn file_not_found(id: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource: ResourceKind::File,
            id: id.into(),
        }
    }

    pub fn permission_not_found(id: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource: ResourceKind::Permission,
            id: id.into(),
        }
    }

    pub fn parent_not_found(id: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource: ResourceKind::Parent,
            id: id.into(),
        }
    }

    /// HTTP status code for this failure.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NotFound { .. } | ApiError::NoRoute { .. } | ApiError::UnknownAction { .. } => {
                404
            }
            ApiError::MissingParameter(_) | ApiError::InvalidBody(_) => 400,
            ApiError::Discovery(_) | ApiError::Encode(_) => 500,
        }
    }

    /// Reason phrase placed on the status line.
    ///
    /// An unresolved route reports "bad request" even though it carries a 404,
    /// which is how clients tell it apart from a missing resource.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } | ApiError::UnknownAction { .. } => "Not Found",
            ApiError::NoRoute { .. } => "bad request",
            ApiError::MissingParameter(_) | ApiError::InvalidBody(_) => "Bad Request",
            ApiError::Discovery(_) | ApiError::Encode(_) => "Internal Server Error",
        }
    }

    fn error_reason(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "notFound",
            ApiError::NoRoute { .. } => "badRequest",
            ApiError::UnknownAction { .. } => "notImplemented",
            ApiError::MissingParameter(_) => "required",
            ApiError::InvalidBody(_) => "parseError",
            ApiError::Discovery(_) | ApiError::Encode(_) => "internalError",
        }
    }

    /// The JSON error body for this failure.
    pub fn envelope(&self) -> ErrorEnvelope {
        let message = format!("{:#}", DisplayChain(self));
        ErrorEnvelope {
            error: ErrorBody {
                errors: vec![ErrorDetail {
                    domain: "global".to_string(),
                    reason: self.error_reason().to_string(),
                    message: message.clone(),
                }],
                code: self.status(),
                message,
            },
        }
    }
}

/// Renders the error message, appending the anyhow context chain for discovery
/// failures so the cause is not lost in the envelope.
struct DisplayChain<'a>(&'a ApiError);

impl fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ApiError::Discovery(err) => write!(f, "{err:#}"),
            other => write!(f, "{other}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<ErrorDetail>,
    pub code: u16,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub domain: String,
    pub reason: String,
    pub message: String,
}

/// Failure surfaced to client code by [`crate::http::TestbedHttp::execute`],
/// mirroring what an HTTP client library raises on a non-success status.
#[derive(Debug, Error)]
#[error("<HttpError {status} \"{reason}\">")]
pub struct HttpError {
    pub status: u16,
    pub reason: String,
    pub content: String,
}

impl HttpError {
    /// Decode the body as an error envelope, if it is one.
    pub fn envelope(&self) -> Option<ErrorEnvelope> {
        serde_json::from_str(&self.content).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_envelope_matches_service_shape() {
        let err = ApiError::file_not_found("fred");
        assert_eq!(err.status(), 404);
        let value = serde_json::to_value(err.envelope()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "error": {
                    "errors": [{
                        "domain": "global",
                        "reason": "notFound",
                        "message": "File not found: fred"
                    }],
                    "code": 404,
                    "message": "File not found: fred"
                }
            })
        );
    }

    #[test]
    fn routing_failures_are_distinct_from_missing_resources() {
        let no_route = ApiError::NoRoute {
            method: "GET".into(),
            path: "nowhere".into(),
        };
        assert_eq!(no_route.status(), 404);
        assert_eq!(no_route.reason(), "bad request");
        assert_eq!(no_route.envelope().error.errors[0].reason, "badRequest");

        let unknown = ApiError::UnknownAction {
            resource: "files".into(),
            action: "trash".into(),
        };
        assert_eq!(unknown.status(), 404);
        assert!(unknown.envelope().error.message.contains("files.trash"));
    }

    #[test]
    fn discovery_errors_keep_context() {
        let err = ApiError::from(anyhow::anyhow!("missing file").context("reading discovery"));
        assert_eq!(err.status(), 500);
        let message = err.envelope().error.message;
        assert!(message.contains("reading discovery"));
        assert!(message.contains("missing file"));
    }
}
