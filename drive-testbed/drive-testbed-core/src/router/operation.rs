use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::error::{ApiError, Result};
use crate::model::{
    Empty, File, FileList, FileRequest, ParentList, ParentReference, ParentRequest, Permission,
    PermissionId, PermissionList, PermissionRequest,
};
use crate::services::Resource;

/// Every store operation the emulator implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    ListFiles,
    InsertFile,
    GetFile,
    UpdateFile,
    DeleteFile,
    CopyFile,
    ListPermissions,
    GetPermission,
    InsertPermission,
    DeletePermission,
    GetIdForEmail,
    ListParents,
    GetParent,
    InsertParent,
    DeleteParent,
}

/// (resource, action name) => operation. `update` and `patch` share an
/// implementation since both overlay the body onto the stored file.
const OPERATIONS: &[(Resource, &str, Operation)] = &[
    (Resource::Files, "list", Operation::ListFiles),
    (Resource::Files, "insert", Operation::InsertFile),
    (Resource::Files, "get", Operation::GetFile),
    (Resource::Files, "update", Operation::UpdateFile),
    (Resource::Files, "patch", Operation::UpdateFile),
    (Resource::Files, "delete", Operation::DeleteFile),
    (Resource::Files, "copy", Operation::CopyFile),
    (Resource::Permissions, "list", Operation::ListPermissions),
    (Resource::Permissions, "get", Operation::GetPermission),
    (Resource::Permissions, "insert", Operation::InsertPermission),
    (Resource::Permissions, "delete", Operation::DeletePermission),
    (Resource::Permissions, "getIdForEmail", Operation::GetIdForEmail),
    (Resource::Parents, "list", Operation::ListParents),
    (Resource::Parents, "get", Operation::GetParent),
    (Resource::Parents, "insert", Operation::InsertParent),
    (Resource::Parents, "delete", Operation::DeleteParent),
];

impl Operation {
    pub fn lookup(resource: Resource, action: &str) -> Option<Self> {
        OPERATIONS
            .iter()
            .find(|(r, a, _)| *r == resource && *a == action)
            .map(|(_, _, op)| *op)
    }

    /// Bind request parameters to this operation's inputs.
    pub fn bind(self, params: &Params) -> Result<Call> {
        let call = match self {
            Operation::ListFiles => Call::ListFiles,
            Operation::InsertFile => Call::InsertFile {
                body: params.body()?,
            },
            Operation::GetFile => Call::GetFile {
                file_id: params.require("fileId")?,
            },
            Operation::UpdateFile => Call::UpdateFile {
                file_id: params.require("fileId")?,
                body: params.body()?,
            },
            Operation::DeleteFile => Call::DeleteFile {
                file_id: params.require("fileId")?,
            },
            Operation::CopyFile => Call::CopyFile {
                file_id: params.require("fileId")?,
                body: params.body()?,
            },
            Operation::ListPermissions => Call::ListPermissions {
                file_id: params.require("fileId")?,
            },
            Operation::GetPermission => Call::GetPermission {
                file_id: params.require("fileId")?,
                permission_id: params.require("permissionId")?,
            },
            Operation::InsertPermission => Call::InsertPermission {
                file_id: params.require("fileId")?,
                body: params.body()?,
            },
            Operation::DeletePermission => Call::DeletePermission {
                file_id: params.require("fileId")?,
                permission_id: params.require("permissionId")?,
            },
            Operation::GetIdForEmail => Call::GetIdForEmail {
                email: params.require("email")?,
            },
            Operation::ListParents => Call::ListParents {
                file_id: params.require("fileId")?,
            },
            Operation::GetParent => Call::GetParent {
                file_id: params.require("fileId")?,
                parent_id: params.require("parentId")?,
            },
            Operation::InsertParent => Call::InsertParent {
                file_id: params.require("fileId")?,
                body: params.body()?,
            },
            Operation::DeleteParent => Call::DeleteParent {
                file_id: params.require("fileId")?,
                parent_id: params.require("parentId")?,
            },
        };
        Ok(call)
    }
}

/// A fully bound request, ready to run against a
/// [`Directory`](crate::directory::Directory).
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    ListFiles,
    InsertFile { body: FileRequest },
    GetFile { file_id: String },
    UpdateFile { file_id: String, body: FileRequest },
    DeleteFile { file_id: String },
    CopyFile { file_id: String, body: FileRequest },
    ListPermissions { file_id: String },
    GetPermission { file_id: String, permission_id: String },
    InsertPermission { file_id: String, body: PermissionRequest },
    DeletePermission { file_id: String, permission_id: String },
    GetIdForEmail { email: String },
    ListParents { file_id: String },
    GetParent { file_id: String, parent_id: String },
    InsertParent { file_id: String, body: ParentRequest },
    DeleteParent { file_id: String, parent_id: String },
}

/// Success payload of a call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    File(File),
    FileList(FileList),
    Permission(Permission),
    PermissionList(PermissionList),
    PermissionId(PermissionId),
    Parent(ParentReference),
    ParentList(ParentList),
    Empty(Empty),
}

impl Reply {
    pub fn empty() -> Self {
        Reply::Empty(Empty {})
    }
}

/// A query parameter after normalization: scalar when it appeared once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    Multiple(Vec<String>),
}

impl QueryValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Single(value) => Some(value),
            QueryValue::Multiple(_) => None,
        }
    }
}

/// Group query pairs by key, unwrapping keys that occur exactly once.
pub fn normalize_query<I>(pairs: I) -> BTreeMap<String, QueryValue>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }
    grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                QueryValue::Single(values.remove(0))
            } else {
                QueryValue::Multiple(values)
            };
            (key, value)
        })
        .collect()
}

/// Inputs gathered for one routed request.
#[derive(Clone, Debug, Default)]
pub struct Params {
    pub path: HashMap<String, String>,
    pub query: BTreeMap<String, QueryValue>,
    pub body: Option<Value>,
}

impl Params {
    /// Path parameters shadow query parameters of the same name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.path
            .get(name)
            .map(String::as_str)
            .or_else(|| self.query.get(name).and_then(QueryValue::as_str))
    }

    fn require(&self, name: &str) -> Result<String> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| ApiError::MissingParameter(name.to_string()))
    }

    fn body<T: DeserializeOwned + Default>(&self) -> Result<T> {
        match &self.body {
            Some(value) => serde_json::from_value(value.clone()).map_err(ApiError::InvalidBody),
            None => Ok(T::default()),
        }
    }
}
