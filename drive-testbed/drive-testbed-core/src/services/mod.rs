//! The three resource collections behind the emulated API.
//!
//! Each service owns one map and knows nothing about the others; the
//! [`Directory`](crate::directory::Directory) wires them together.

pub mod files;
pub mod parents;
pub mod permissions;

pub use files::FilesService;
pub use parents::ParentsService;
pub use permissions::PermissionsService;

/// Logical name of a resource collection, as used in discovery documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Files,
    Permissions,
    Parents,
}

impl Resource {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "files" => Some(Resource::Files),
            "permissions" => Some(Resource::Permissions),
            "parents" => Some(Resource::Parents),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Files => "files",
            Resource::Permissions => "permissions",
            Resource::Parents => "parents",
        }
    }
}
