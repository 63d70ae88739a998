use chrono::Utc;
use std::collections::HashMap;

use crate::error::{ApiError, Result};
use crate::id;
use crate::model::{File, FileList, FileRequest, User, DEFAULT_MIME_TYPE, FILE_KIND};

/// The Files collection, keyed by file id and listed in insertion order.
///
/// Creating a file has side effects on the other stores, so the creating
/// operations are crate-private and reached through
/// [`crate::directory::Directory`].
#[derive(Debug, Default)]
pub struct FilesService {
    files: HashMap<String, File>,
    order: Vec<String>,
}

impl FilesService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.files.contains_key(file_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &File> {
        self.order.iter().filter_map(|id| self.files.get(id))
    }

    pub fn list(&self) -> FileList {
        FileList::new(self.iter().cloned().collect())
    }

    pub fn get(&self, file_id: &str) -> Result<&File> {
        self.files
            .get(file_id)
            .ok_or_else(|| ApiError::file_not_found(file_id))
    }

    /// Store a new file built from `request` under a freshly generated id.
    /// Any id in the request is ignored.
    pub(crate) fn insert(&mut self, request: &FileRequest, owner: &User) -> File {
        let now = Utc::now();
        let mut file = File {
            kind: FILE_KIND.to_string(),
            id: id::new_id(),
            title: None,
            description: None,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            owners: vec![owner.clone()],
            created_date: Some(now),
            modified_date: Some(now),
            extra: Default::default(),
        };
        file.overlay(request);
        self.put(file.clone());
        file
    }

    /// Store a pre-built file, keeping its id when it has one.
    pub(crate) fn seed(&mut self, mut file: File, owner: &User) -> File {
        if file.id.is_empty() {
            file.id = id::new_id();
        }
        if file.owners.is_empty() {
            file.owners.push(owner.clone());
        }
        let now = Utc::now();
        file.created_date.get_or_insert(now);
        file.modified_date.get_or_insert(now);
        file.kind = FILE_KIND.to_string();
        self.put(file.clone());
        file
    }

    fn put(&mut self, file: File) {
        if !self.files.contains_key(&file.id) {
            self.order.push(file.id.clone());
        }
        tracing::debug!(file_id = %file.id, title = ?file.title, "stored file");
        self.files.insert(file.id.clone(), file);
    }

    /// Overlay `request` onto an existing file.
    pub fn update(&mut self, file_id: &str, request: &FileRequest) -> Result<File> {
        let file = self
            .files
            .get_mut(file_id)
            .ok_or_else(|| ApiError::file_not_found(file_id))?;
        file.overlay(request);
        file.modified_date = Some(Utc::now());
        tracing::debug!(file_id, "updated file");
        Ok(file.clone())
    }

    /// Remove a file. Its permissions and parents are left in place.
    pub fn delete(&mut self, file_id: &str) -> Result<()> {
        if self.files.remove(file_id).is_none() {
            return Err(ApiError::file_not_found(file_id));
        }
        self.order.retain(|id| id != file_id);
        tracing::debug!(file_id, "deleted file");
        Ok(())
    }

    /// The request a copy of `file_id` is inserted from: the source's fields
    /// with `body` laid over them.
    pub(crate) fn copy_request(&self, file_id: &str, body: &FileRequest) -> Result<FileRequest> {
        let mut source = self.get(file_id)?.clone();
        source.overlay(body);
        Ok(FileRequest::from(source))
    }
}
