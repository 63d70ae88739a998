use std::collections::HashMap;

use crate::error::{ApiError, Result};
use crate::model::{Permission, PermissionId, PermissionList, PermissionRequest, User};

/// Permissions per file id, in the order they were granted.
#[derive(Debug, Default)]
pub struct PermissionsService {
    permissions: HashMap<String, Vec<Permission>>,
}

impl PermissionsService {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self, file_id: &str) -> Result<&Vec<Permission>> {
        self.permissions
            .get(file_id)
            .ok_or_else(|| ApiError::file_not_found(file_id))
    }

    pub fn list(&self, file_id: &str) -> Result<PermissionList> {
        Ok(PermissionList::new(self.entries(file_id)?.clone()))
    }

    pub fn get(&self, file_id: &str, permission_id: &str) -> Result<Permission> {
        self.entries(file_id)?
            .iter()
            .find(|p| p.id == permission_id)
            .cloned()
            .ok_or_else(|| ApiError::permission_not_found(permission_id))
    }

    pub fn insert(&mut self, file_id: &str, request: &PermissionRequest) -> Result<Permission> {
        let entries = self
            .permissions
            .get_mut(file_id)
            .ok_or_else(|| ApiError::file_not_found(file_id))?;
        let permission = Permission::from_request(request);
        tracing::debug!(
            file_id,
            permission_id = %permission.id,
            role = %permission.role,
            "granted permission"
        );
        entries.push(permission.clone());
        Ok(permission)
    }

    /// Remove the first permission with `permission_id`. Unknown files and
    /// permissions are ignored.
    pub fn delete(&mut self, file_id: &str, permission_id: &str) {
        if let Some(entries) = self.permissions.get_mut(file_id) {
            if let Some(pos) = entries.iter().position(|p| p.id == permission_id) {
                entries.remove(pos);
                tracing::debug!(file_id, permission_id, "revoked permission");
            }
        }
    }

    pub fn id_for_email(&self, email: &str) -> PermissionId {
        PermissionId::for_email(email)
    }

    pub(crate) fn add_owner(&mut self, file_id: &str, owner: &User) {
        let entries = self.permissions.entry(file_id.to_string()).or_default();
        if !entries
            .iter()
            .any(|p| p.role == "owner" && p.id == owner.permission_id)
        {
            entries.push(Permission::owner(owner));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_file(file_id: &str) -> PermissionsService {
        let mut perms = PermissionsService::new();
        perms.add_owner(file_id, &User::authenticated("owner@drivetestbed.org"));
        perms
    }

    fn grant(grantee_type: &str, value: Option<&str>) -> PermissionRequest {
        PermissionRequest {
            value: value.map(str::to_string),
            grantee_type: Some(grantee_type.to_string()),
            role: Some("reader".to_string()),
            name: None,
        }
    }

    #[test]
    fn default_owner_permission() {
        let perms = with_file("F");
        let list = perms.list("F").unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].role, "owner");
        assert_eq!(list.items[0].grantee_type, "user");
        assert_eq!(list.items[0].email_address, "owner@drivetestbed.org");
    }

    #[test]
    fn unknown_file_and_permission_have_distinct_errors() {
        let perms = with_file("F");
        let file_err = perms.get("fred", "fred").unwrap_err();
        assert_eq!(file_err.to_string(), "File not found: fred");
        let perm_err = perms.get("F", "fred").unwrap_err();
        assert_eq!(perm_err.to_string(), "Permission not found: fred");
        assert!(perms.list("fred").is_err());
    }

    #[test]
    fn insert_appends_in_order() {
        let mut perms = with_file("F");
        perms.insert("F", &grant("domain", Some("example.org"))).unwrap();
        perms.insert("F", &grant("anyone", None)).unwrap();
        let items = perms.list("F").unwrap().items;
        let types: Vec<_> = items.iter().map(|p| p.grantee_type.as_str()).collect();
        assert_eq!(types, ["user", "domain", "anyone"]);
        assert!(perms.insert("missing", &grant("anyone", None)).is_err());
    }

    #[test]
    fn owner_is_added_once() {
        let owner = User::authenticated("owner@drivetestbed.org");
        let mut perms = with_file("F");
        perms.add_owner("F", &owner);
        assert_eq!(perms.list("F").unwrap().items.len(), 1);

        perms.add_owner("F", &User::authenticated("other@drivetestbed.org"));
        assert_eq!(perms.list("F").unwrap().items.len(), 2);
    }

    #[test]
    fn self_grant_shares_the_owner_id_and_delete_takes_the_first() {
        let mut perms = with_file("F");
        let grant = perms
            .insert("F", &grant("user", Some("owner@drivetestbed.org")))
            .unwrap();
        let owner_id = perms.list("F").unwrap().items[0].id.clone();
        assert_eq!(grant.id, owner_id);

        perms.delete("F", &grant.id);
        let items = perms.list("F").unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].role, "reader");
    }

    #[test]
    fn delete_is_lenient() {
        let mut perms = with_file("F");
        let granted = perms.insert("F", &grant("group", Some("g@example.org"))).unwrap();
        perms.delete("F", "nobody");
        perms.delete("missing", &granted.id);
        assert_eq!(perms.list("F").unwrap().items.len(), 2);
        perms.delete("F", &granted.id);
        assert_eq!(perms.list("F").unwrap().items.len(), 1);
    }
}
