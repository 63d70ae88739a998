use std::collections::HashMap;

use crate::error::{ApiError, Result};
use crate::model::{ParentList, ParentReference, ParentRequest};

/// Parent references per file id. A parent id appears at most once per file.
#[derive(Debug, Default)]
pub struct ParentsService {
    parents: HashMap<String, Vec<ParentReference>>,
}

impl ParentsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, file_id: &str) -> Result<ParentList> {
        self.parents
            .get(file_id)
            .map(|items| ParentList::new(items.clone()))
            .ok_or_else(|| ApiError::file_not_found(file_id))
    }

    pub fn get(&self, file_id: &str, parent_id: &str) -> Result<ParentReference> {
        self.parents
            .get(file_id)
            .ok_or_else(|| ApiError::file_not_found(file_id))?
            .iter()
            .find(|p| p.id == parent_id)
            .cloned()
            .ok_or_else(|| ApiError::parent_not_found(parent_id))
    }

    /// Add `request.id` as a parent of `file_id`; an existing entry is
    /// returned unchanged.
    pub fn insert(&mut self, file_id: &str, request: &ParentRequest) -> Result<ParentReference> {
        let entries = self
            .parents
            .get_mut(file_id)
            .ok_or_else(|| ApiError::file_not_found(file_id))?;
        if let Some(existing) = entries.iter().find(|p| p.id == request.id) {
            return Ok(existing.clone());
        }
        let parent = ParentReference::new(file_id, &request.id, false);
        tracing::debug!(file_id, parent_id = %parent.id, "added parent");
        entries.push(parent.clone());
        Ok(parent)
    }

    pub fn delete(&mut self, file_id: &str, parent_id: &str) {
        if let Some(entries) = self.parents.get_mut(file_id) {
            if let Some(pos) = entries.iter().position(|p| p.id == parent_id) {
                entries.remove(pos);
                tracing::debug!(file_id, parent_id, "removed parent");
            }
        }
    }

    pub(crate) fn add_root(&mut self, file_id: &str) {
        let entries = self.parents.entry(file_id.to_string()).or_default();
        if !entries.iter().any(|p| p.is_root) {
            entries.push(ParentReference::root(file_id));
        }
    }
}
