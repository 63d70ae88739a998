//! Client-level scenarios driven through the transport shim, the way a Drive
//! client library would use it.

use drive_testbed_core::{
    Directory, DirectoryHandle, HttpError, TestbedConfig, TestbedHttp,
};
use serde_json::{json, Value};

const API: &str = "https://www.googleapis.com/drive/v2";
const ONE_FILE_ID: &str = "ONE_TEST_FILE";

struct Drive {
    http: TestbedHttp,
}

impl Drive {
    fn new(http: TestbedHttp) -> Self {
        Self { http }
    }

    fn get(&self, path: &str) -> Result<Value, HttpError> {
        self.http.execute("GET", &format!("{API}/{path}"), None)
    }

    fn post(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        self.http.execute("POST", &format!("{API}/{path}"), Some(&body))
    }

    fn delete(&self, path: &str) -> Result<Value, HttpError> {
        self.http.execute("DELETE", &format!("{API}/{path}"), None)
    }
}

fn service() -> Drive {
    Drive::new(TestbedHttp::default())
}

fn one_file_service() -> Drive {
    let config = TestbedConfig::new().with_files([json!({
        "title": "test",
        "description": "test description",
        "mimeType": "text/plain",
        "id": ONE_FILE_ID
    })]);
    Drive::new(TestbedHttp::new(config).unwrap())
}

fn test_body() -> Value {
    json!({
        "title": "test",
        "description": "test description",
        "mimeType": "text/plain"
    })
}

fn folder_body() -> Value {
    json!({
        "title": "test folder",
        "description": "test description",
        "mimeType": "application/vnd.google-apps.folder"
    })
}

#[test]
fn empty_files_list() {
    let response = service().get("files").unwrap();
    assert_eq!(response["items"].as_array().unwrap().len(), 0);
    assert!(response.get("etag").is_some());
    assert_eq!(response["kind"], "drive#fileList");
}

#[test]
fn insert_then_get() {
    let drive = service();
    let body = test_body();
    let inserted = drive.post("files", body.clone()).unwrap();
    assert!(inserted["id"].as_str().is_some());
    for field in ["title", "description", "mimeType"] {
        assert_eq!(inserted[field], body[field]);
    }
    let id = inserted["id"].as_str().unwrap();
    let fetched = drive.get(&format!("files/{id}")).unwrap();
    assert_eq!(fetched, inserted);
}

#[test]
fn list_after_insert() {
    let drive = service();
    let inserted = drive.post("files", test_body()).unwrap();
    let listed = drive.get("files").unwrap();
    let items = listed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], inserted["id"]);
}

#[test]
fn get_missing_file_is_404() {
    let err = service().get("files/fred").unwrap_err();
    assert_eq!(err.status, 404);
    let envelope = err.envelope().unwrap();
    assert_eq!(envelope.error.code, 404);
    assert_eq!(envelope.error.errors[0].reason, "notFound");
}

#[test]
fn delete_seeded_file() {
    let drive = one_file_service();
    let response = drive.delete(&format!("files/{ONE_FILE_ID}")).unwrap();
    assert_eq!(response, json!({}));
    let listed = drive.get("files").unwrap();
    assert!(listed["items"].as_array().unwrap().is_empty());
    assert_eq!(drive.delete(&format!("files/{ONE_FILE_ID}")).unwrap_err().status, 404);
}

#[test]
fn copy_seeded_file() {
    let drive = one_file_service();
    let copied = drive
        .post(
            &format!("files/{ONE_FILE_ID}/copy"),
            json!({"title": "A copied test file"}),
        )
        .unwrap();
    assert_eq!(copied["title"], "A copied test file");
    assert_ne!(copied["id"], ONE_FILE_ID);
    assert_eq!(drive.get("files").unwrap()["items"].as_array().unwrap().len(), 2);
}

#[test]
fn copy_missing_file_is_404() {
    let err = service()
        .post(
            &format!("files/{ONE_FILE_ID}/copy"),
            json!({"title": "A copied test file"}),
        )
        .unwrap_err();
    assert_eq!(err.status, 404);
}

#[test]
fn new_files_are_owned_by_the_configured_user() {
    let config = TestbedConfig::new().with_user_email("usertest@drivetestbed.org");
    let drive = Drive::new(TestbedHttp::new(config).unwrap());
    drive.post("files", test_body()).unwrap();
    let listed = drive.get("files").unwrap();
    let items = listed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    let owners = items[0]["owners"].as_array().unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0]["emailAddress"], "usertest@drivetestbed.org");
}

#[test]
fn permission_lookups_on_unknown_ids() {
    let err = service().get("files/fred/permissions/fred").unwrap_err();
    assert_eq!(err.envelope().unwrap().error.message, "File not found: fred");

    let err = one_file_service()
        .get(&format!("files/{ONE_FILE_ID}/permissions/fred"))
        .unwrap_err();
    assert_eq!(err.envelope().unwrap().error.message, "Permission not found: fred");
}

#[test]
fn default_permissions_list() {
    let response = one_file_service()
        .get(&format!("files/{ONE_FILE_ID}/permissions"))
        .unwrap();
    assert_eq!(response["items"].as_array().unwrap().len(), 1);
    assert!(response.get("etag").is_some());
    assert_eq!(response["kind"], "drive#permissionList");
}

#[test]
fn id_for_email() {
    let response = service().get("permissionIds/fred@gmail.com").unwrap();
    assert_eq!(response["kind"], "drive#permissionId");
    assert!(!response["id"].as_str().unwrap().is_empty());
}

fn insert_permission(drive: &Drive, body: Value) -> Value {
    let response = drive
        .post(&format!("files/{ONE_FILE_ID}/permissions"), body)
        .unwrap();
    assert_eq!(response["kind"], "drive#permission");
    response
}

fn permissions(drive: &Drive) -> Vec<Value> {
    drive.get(&format!("files/{ONE_FILE_ID}/permissions")).unwrap()["items"]
        .as_array()
        .unwrap()
        .clone()
}

#[test]
fn insert_user_and_group_permissions() {
    for (grantee, address) in [
        ("user", "test_reader@drivetestbed.org"),
        ("group", "group@drivetestbed.org"),
    ] {
        let drive = one_file_service();
        insert_permission(
            &drive,
            json!({"value": address, "type": grantee, "role": "reader"}),
        );
        let items = permissions(&drive);
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|p| p["emailAddress"] == address
            && p["type"] == grantee
            && p["role"] == "reader"));
    }
}

#[test]
fn insert_domain_permission() {
    let drive = one_file_service();
    insert_permission(
        &drive,
        json!({"value": "drivetestbed.org", "type": "domain", "role": "reader"}),
    );
    let items = permissions(&drive);
    assert_eq!(items.len(), 2);
    assert!(items.iter().any(|p| p["domain"] == "drivetestbed.org"
        && p["emailAddress"] == ""
        && p["type"] == "domain"));
}

#[test]
fn insert_anyone_permission() {
    let drive = one_file_service();
    insert_permission(&drive, json!({"type": "anyone", "role": "reader"}));
    let items = permissions(&drive);
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .any(|p| p["type"] == "anyone" && p["role"] == "reader"));
}

#[test]
fn delete_permission() {
    let drive = one_file_service();
    let inserted = insert_permission(
        &drive,
        json!({"value": "drivetestbed.org", "type": "domain", "role": "reader"}),
    );
    let id = inserted["id"].as_str().unwrap();
    drive
        .delete(&format!("files/{ONE_FILE_ID}/permissions/{id}"))
        .unwrap();
    assert_eq!(permissions(&drive).len(), 1);
}

#[test]
fn inserted_file_gets_owner_permission_and_root_parent() {
    let drive = service();
    let inserted = drive.post("files", test_body()).unwrap();
    let id = inserted["id"].as_str().unwrap();
    let perms = drive.get(&format!("files/{id}/permissions")).unwrap();
    assert_eq!(perms["items"].as_array().unwrap().len(), 1);
    let parents = drive.get(&format!("files/{id}/parents")).unwrap();
    let items = parents["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["isRoot"], true);
    assert_eq!(parents["kind"], "drive#parentList");
}

fn parents(drive: &Drive) -> Vec<Value> {
    drive.get(&format!("files/{ONE_FILE_ID}/parents")).unwrap()["items"]
        .as_array()
        .unwrap()
        .clone()
}

#[test]
fn insert_into_folder() {
    let drive = one_file_service();
    let folder = drive.post("files", folder_body()).unwrap();
    let parent = drive
        .post(
            &format!("files/{ONE_FILE_ID}/parents"),
            json!({"id": folder["id"]}),
        )
        .unwrap();
    assert_eq!(parent["kind"], "drive#parentReference");
    assert_eq!(parent["isRoot"], false);
    assert_eq!(parents(&drive).len(), 2);
}

#[test]
fn insert_twice_into_folder() {
    let drive = one_file_service();
    let folder = drive.post("files", folder_body()).unwrap();
    let body = json!({"id": folder["id"]});
    drive
        .post(&format!("files/{ONE_FILE_ID}/parents"), body.clone())
        .unwrap();
    drive
        .post(&format!("files/{ONE_FILE_ID}/parents"), body)
        .unwrap();
    assert_eq!(parents(&drive).len(), 2);
}

#[test]
fn insert_and_delete_from_folder() {
    let drive = one_file_service();
    let folder = drive.post("files", folder_body()).unwrap();
    let parent = drive
        .post(
            &format!("files/{ONE_FILE_ID}/parents"),
            json!({"id": folder["id"]}),
        )
        .unwrap();
    let parent_id = parent["id"].as_str().unwrap();
    drive
        .delete(&format!("files/{ONE_FILE_ID}/parents/{parent_id}"))
        .unwrap();
    assert_eq!(parents(&drive).len(), 1);
}

#[test]
fn update_and_patch_overlay_fields() {
    let drive = one_file_service();
    let uri = format!("{API}/files/{ONE_FILE_ID}");
    let updated = drive
        .http
        .execute("PUT", &uri, Some(&json!({"title": "renamed"})))
        .unwrap();
    assert_eq!(updated["title"], "renamed");
    assert_eq!(updated["description"], "test description");

    let patched = drive
        .http
        .execute("PATCH", &uri, Some(&json!({"description": "patched"})))
        .unwrap();
    assert_eq!(patched["title"], "renamed");
    assert_eq!(patched["description"], "patched");
    assert_eq!(patched["id"], ONE_FILE_ID);
}

#[test]
fn declared_but_unemulated_action() {
    let err = one_file_service()
        .post(&format!("files/{ONE_FILE_ID}/trash"), json!({}))
        .unwrap_err();
    assert_eq!(err.status, 404);
    assert!(err.content.contains("files.trash"));
}

#[test]
fn shared_directory_across_transports() {
    let shared = DirectoryHandle::new(
        Directory::with_files(
            "global@drivetestbed.org",
            &[json!({
                "title": "test global",
                "description": "test global description",
                "mimeType": "text/plain",
                "id": "GLOBAL_FILE_ID"
            })],
        )
        .unwrap(),
    );

    let first = Drive::new(TestbedHttp::new(TestbedConfig::new().shared(shared.clone())).unwrap());
    let listed = first.get("files").unwrap();
    let items = listed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "GLOBAL_FILE_ID");

    first.post("files", test_body()).unwrap();
    let second = Drive::new(TestbedHttp::new(TestbedConfig::new().shared(shared)).unwrap());
    assert_eq!(second.get("files").unwrap()["items"].as_array().unwrap().len(), 2);

    // An isolated transport sees none of it.
    assert!(service().get("files").unwrap()["items"].as_array().unwrap().is_empty());
}
