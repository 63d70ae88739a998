//! Route table built from the discovery document.

use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::fmt;

use super::discovery::DiscoveryDocument;
use super::operation::Operation;
use crate::services::Resource;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path template such as `files/{fileId}/permissions`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Self {
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Bind the template against decoded path segments.
    fn matches(&self, segments: &[String]) -> Option<HashMap<String, String>> {
        if segments.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (template, actual) in self.segments.iter().zip(segments) {
            match template {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), actual.clone());
                }
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match segment {
                Segment::Literal(literal) => f.write_str(literal)?,
                Segment::Param(name) => write!(f, "{{{name}}}")?,
            }
        }
        Ok(())
    }
}

/// What a matched route runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Operation(Operation),
    /// Declared by the discovery document but not emulated.
    Unimplemented,
}

#[derive(Clone, Debug)]
pub struct Route {
    pub resource: String,
    pub action: String,
    pub http_method: String,
    pub template: PathTemplate,
    pub expects_body: bool,
    pub target: Target,
}

#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn from_discovery(document: &DiscoveryDocument) -> Self {
        let mut routes = Vec::new();
        for (resource_name, resource) in &document.resources {
            let store = Resource::from_name(resource_name);
            for (action, method) in &resource.methods {
                let target = store
                    .and_then(|store| Operation::lookup(store, action))
                    .map(Target::Operation)
                    .unwrap_or(Target::Unimplemented);
                routes.push(Route {
                    resource: resource_name.clone(),
                    action: action.clone(),
                    http_method: method.http_method.to_ascii_uppercase(),
                    template: PathTemplate::parse(&method.path),
                    expects_body: method.request.is_some(),
                    target,
                });
            }
        }
        // Most specific templates are tried first.
        routes.sort_by_key(|r| std::cmp::Reverse(r.template.literal_count()));
        tracing::debug!(routes = routes.len(), "built route table");
        Self { routes }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Find the route for `method` on `path` (relative to the API prefix) and
    /// the path parameters it binds.
    pub fn resolve(&self, method: &str, path: &str) -> Option<(&Route, HashMap<String, String>)> {
        let segments = split_path(path);
        self.routes
            .iter()
            .filter(|route| route.http_method.eq_ignore_ascii_case(method))
            .find_map(|route| route.template.matches(&segments).map(|p| (route, p)))
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}
