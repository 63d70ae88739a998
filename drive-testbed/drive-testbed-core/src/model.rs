//! Wire-shaped resource records and list envelopes.
//!
//! Field names follow the service's JSON payloads (camelCase, `kind` tags),
//! so every type here serializes straight into a response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id;

pub const API_BASE: &str = "https://www.googleapis.com/drive/v2";

pub const FILE_KIND: &str = "drive#file";
pub const FILE_LIST_KIND: &str = "drive#fileList";
pub const PERMISSION_KIND: &str = "drive#permission";
pub const PERMISSION_LIST_KIND: &str = "drive#permissionList";
pub const PERMISSION_ID_KIND: &str = "drive#permissionId";
pub const PARENT_KIND: &str = "drive#parentReference";
pub const PARENT_LIST_KIND: &str = "drive#parentList";
pub const USER_KIND: &str = "drive#user";

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Id of the top-level container every new file starts in.
pub const ROOT_FOLDER_ID: &str = "0AAAAAAAAAAAAUk9PVA";

pub const FILE_LIST_ETAG: &str = "\"ALmZNavQ1pakoTwofyfJ4wBG6iY/vyGp6PvFo4RvsFtPoIWeCReyIC8\"";
pub const FILE_LIST_SELF_LINK: &str =
    "https://www.googleapis.com/drive/v2/files?q=trashed+%3D+false";
pub const PERMISSION_ETAG: &str = "\"ALmZNavQ1pakoTwofyfJ4wBG6iY/nb2sPF2VBx6pXMRjIx6vDqZIJCk\"";
pub const PERMISSION_LIST_ETAG: &str =
    "\"ALmZNavQ1pakoTwofyfJ4wBG6iY/1uNzKDHuN9W5Vvj4yvyRGbpYfCc\"";

/// File fields the emulator controls; callers cannot smuggle them in through
/// the pass-through bucket.
const RESERVED_FILE_FIELDS: &[&str] = &["id", "kind", "owners", "createdDate", "modifiedDate"];

fn file_kind() -> String {
    FILE_KIND.to_string()
}

fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

/// The configured identity, as it appears in a file's `owners` list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub kind: String,
    pub display_name: String,
    pub email_address: String,
    pub permission_id: String,
    #[serde(default)]
    pub is_authenticated_user: bool,
}

impl User {
    pub fn authenticated(email: &str) -> Self {
        Self {
            kind: USER_KIND.to_string(),
            display_name: display_name(email),
            email_address: email.to_string(),
            permission_id: id::permission_id_for(email),
            is_authenticated_user: true,
        }
    }

    /// Domain part of the user's address, empty when there is none.
    pub fn domain(&self) -> &str {
        domain_of(&self.email_address)
    }
}

fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

pub(crate) fn domain_of(email: &str) -> &str {
    email.split_once('@').map(|(_, domain)| domain).unwrap_or("")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(default = "file_kind")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<DateTime<Utc>>,
    /// Caller-supplied fields the emulator does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl File {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Overlay the fields present in `request`, leaving `id` and ownership alone.
    pub fn overlay(&mut self, request: &FileRequest) {
        if let Some(title) = &request.title {
            self.title = Some(title.clone());
        }
        if let Some(description) = &request.description {
            self.description = Some(description.clone());
        }
        if let Some(mime_type) = &request.mime_type {
            self.mime_type = mime_type.clone();
        }
        for (key, value) in request.passthrough() {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Body accepted by `files.insert`, `files.copy` and `files.update`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileRequest {
    /// Extra fields minus the ones the emulator assigns itself.
    pub fn passthrough(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.extra
            .iter()
            .filter(|(key, _)| !RESERVED_FILE_FIELDS.contains(&key.as_str()))
    }
}

impl From<File> for FileRequest {
    fn from(file: File) -> Self {
        Self {
            title: file.title,
            description: file.description,
            mime_type: Some(file.mime_type),
            extra: file.extra,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    pub kind: String,
    pub etag: String,
    pub self_link: String,
    pub items: Vec<File>,
}

impl FileList {
    pub fn new(items: Vec<File>) -> Self {
        Self {
            kind: FILE_LIST_KIND.to_string(),
            etag: FILE_LIST_ETAG.to_string(),
            self_link: FILE_LIST_SELF_LINK.to_string(),
            items,
        }
    }
}

/// Grantee category of a permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GranteeType {
    User,
    Group,
    Domain,
    Anyone,
}

impl GranteeType {
    /// Unrecognized types behave like `anyone`.
    pub fn parse(s: &str) -> Self {
        match s {
            "user" => GranteeType::User,
            "group" => GranteeType::Group,
            "domain" => GranteeType::Domain,
            _ => GranteeType::Anyone,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub kind: String,
    pub etag: String,
    pub id: String,
    pub name: String,
    pub email_address: String,
    pub domain: String,
    pub role: String,
    #[serde(rename = "type")]
    pub grantee_type: String,
}

impl Permission {
    /// The owner permission stamped on every new file.
    pub fn owner(user: &User) -> Self {
        Self {
            kind: PERMISSION_KIND.to_string(),
            etag: PERMISSION_ETAG.to_string(),
            id: user.permission_id.clone(),
            name: user.display_name.clone(),
            email_address: user.email_address.clone(),
            domain: user.domain().to_string(),
            role: "owner".to_string(),
            grantee_type: "user".to_string(),
        }
    }

    /// Build a permission from an insert request.
    ///
    /// `user` and `group` grants carry an address in `value`, `domain` grants
    /// carry the domain itself, and `anyone` carries nothing.
    pub fn from_request(request: &PermissionRequest) -> Self {
        let grantee_type = request.grantee_type.clone().unwrap_or_default();
        let value = request.value.clone().unwrap_or_default();
        let (id, email_address, domain) = match GranteeType::parse(&grantee_type) {
            GranteeType::User | GranteeType::Group => (
                id::permission_id_for(&value),
                value.clone(),
                domain_of(&value).to_string(),
            ),
            GranteeType::Domain => (id::permission_id_for(&value), String::new(), value),
            GranteeType::Anyone => ("anyone".to_string(), String::new(), String::new()),
        };
        Self {
            kind: PERMISSION_KIND.to_string(),
            etag: PERMISSION_ETAG.to_string(),
            id,
            name: request.name.clone().unwrap_or_default(),
            email_address,
            domain,
            role: request.role.clone().unwrap_or_default(),
            grantee_type,
        }
    }
}

/// Body accepted by `permissions.insert`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub grantee_type: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PermissionList {
    pub kind: String,
    pub etag: String,
    pub items: Vec<Permission>,
}

impl PermissionList {
    pub fn new(items: Vec<Permission>) -> Self {
        Self {
            kind: PERMISSION_LIST_KIND.to_string(),
            etag: PERMISSION_LIST_ETAG.to_string(),
            items,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PermissionId {
    pub kind: String,
    pub id: String,
}

impl PermissionId {
    pub fn for_email(email: &str) -> Self {
        Self {
            kind: PERMISSION_ID_KIND.to_string(),
            id: id::permission_id_for(email),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    pub kind: String,
    pub id: String,
    pub self_link: String,
    pub parent_link: String,
    pub is_root: bool,
}

impl ParentReference {
    pub fn new(file_id: &str, parent_id: &str, is_root: bool) -> Self {
        Self {
            kind: PARENT_KIND.to_string(),
            id: parent_id.to_string(),
            self_link: format!("{API_BASE}/files/{file_id}/parents/{parent_id}"),
            parent_link: format!("{API_BASE}/files/{parent_id}"),
            is_root,
        }
    }

    pub fn root(file_id: &str) -> Self {
        Self::new(file_id, ROOT_FOLDER_ID, true)
    }
}

/// Body accepted by `parents.insert`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentRequest {
    #[serde(default)]
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParentList {
    pub kind: String,
    pub items: Vec<ParentReference>,
}

impl ParentList {
    pub fn new(items: Vec<ParentReference>) -> Self {
        Self {
            kind: PARENT_LIST_KIND.to_string(),
            items,
        }
    }
}

/// Payload of a successful delete: `{}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}
