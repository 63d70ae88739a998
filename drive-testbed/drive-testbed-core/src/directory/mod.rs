//! The Directory: aggregate root of one emulated backend.
//!
//! It owns the Files, Permissions and Parents stores plus the configured user
//! identity. Creating a file is the only cross-store write: the new id gets an
//! owner permission and a root parent reference, and that fan-out happens here
//! rather than inside the Files store.

use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::model::{File, FileRequest, User};
use crate::router::{Call, Reply};
use crate::services::{FilesService, ParentsService, PermissionsService};

#[derive(Debug)]
pub struct Directory {
    user: User,
    files: FilesService,
    permissions: PermissionsService,
    parents: ParentsService,
}

impl Directory {
    pub fn new(user_email: &str) -> Self {
        Self {
            user: User::authenticated(user_email),
            files: FilesService::new(),
            permissions: PermissionsService::new(),
            parents: ParentsService::new(),
        }
    }

    /// Build a directory pre-populated with `seed` files. Seeds keep their ids;
    /// seeds without one get a generated id.
    pub fn with_files(user_email: &str, seed: &[Value]) -> Result<Self> {
        let mut directory = Self::new(user_email);
        for value in seed {
            let file: File = serde_json::from_value(value.clone()).map_err(ApiError::InvalidBody)?;
            directory.seed_file(file);
        }
        tracing::info!(user = %user_email, files = directory.files.len(), "created directory");
        Ok(directory)
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_email(&self) -> &str {
        &self.user.email_address
    }

    pub fn files(&self) -> &FilesService {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut FilesService {
        &mut self.files
    }

    pub fn permissions(&self) -> &PermissionsService {
        &self.permissions
    }

    pub fn permissions_mut(&mut self) -> &mut PermissionsService {
        &mut self.permissions
    }

    pub fn parents(&self) -> &ParentsService {
        &self.parents
    }

    pub fn parents_mut(&mut self) -> &mut ParentsService {
        &mut self.parents
    }

    pub fn insert_file(&mut self, request: &FileRequest) -> File {
        let file = self.files.insert(request, &self.user);
        self.file_created(&file.id);
        file
    }

    pub fn seed_file(&mut self, file: File) -> File {
        let file = self.files.seed(file, &self.user);
        self.file_created(&file.id);
        file
    }

    /// Copy `file_id` with `body` laid over it. The copy gets its own id,
    /// owner permission and root parent; the source's are not copied.
    pub fn copy_file(&mut self, file_id: &str, body: &FileRequest) -> Result<File> {
        let request = self.files.copy_request(file_id, body)?;
        let copy = self.insert_file(&request);
        tracing::debug!(source = file_id, copy = %copy.id, "copied file");
        Ok(copy)
    }

    fn file_created(&mut self, file_id: &str) {
        self.permissions.add_owner(file_id, &self.user);
        self.parents.add_root(file_id);
    }

    /// Run a bound call.
    pub fn execute(&mut self, call: Call) -> Result<Reply> {
        let reply = match call {
            Call::ListFiles => Reply::FileList(self.files.list()),
            Call::InsertFile { body } => Reply::File(self.insert_file(&body)),
            Call::GetFile { file_id } => Reply::File(self.files.get(&file_id)?.clone()),
            Call::UpdateFile { file_id, body } => Reply::File(self.files.update(&file_id, &body)?),
            Call::DeleteFile { file_id } => {
                self.files.delete(&file_id)?;
                Reply::empty()
            }
            Call::CopyFile { file_id, body } => Reply::File(self.copy_file(&file_id, &body)?),
            Call::ListPermissions { file_id } => {
                Reply::PermissionList(self.permissions.list(&file_id)?)
            }
            Call::GetPermission {
                file_id,
                permission_id,
            } => Reply::Permission(self.permissions.get(&file_id, &permission_id)?),
            Call::InsertPermission { file_id, body } => {
                Reply::Permission(self.permissions.insert(&file_id, &body)?)
            }
            Call::DeletePermission {
                file_id,
                permission_id,
            } => {
                self.permissions.delete(&file_id, &permission_id);
                Reply::empty()
            }
            Call::GetIdForEmail { email } => {
                Reply::PermissionId(self.permissions.id_for_email(&email))
            }
            Call::ListParents { file_id } => Reply::ParentList(self.parents.list(&file_id)?),
            Call::GetParent { file_id, parent_id } => {
                Reply::Parent(self.parents.get(&file_id, &parent_id)?)
            }
            Call::InsertParent { file_id, body } => {
                Reply::Parent(self.parents.insert(&file_id, &body)?)
            }
            Call::DeleteParent { file_id, parent_id } => {
                self.parents.delete(&file_id, &parent_id);
                Reply::empty()
            }
        };
        Ok(reply)
    }
}

/// Shareable, lock-protected directory.
///
/// One lock covers all three stores, so a file insert and its default
/// permission and parent appear together to every other holder.
#[derive(Clone, Debug)]
pub struct DirectoryHandle {
    inner: Arc<Mutex<Directory>>,
}

impl DirectoryHandle {
    pub fn new(directory: Directory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(directory)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Directory> {
        self.inner.lock()
    }

    /// Whether both handles refer to the same backend.
    pub fn same_as(&self, other: &DirectoryHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Directory> for DirectoryHandle {
    fn from(directory: Directory) -> Self {
        Self::new(directory)
    }
}
