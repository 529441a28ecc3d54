//! DriveClient against a local Drive v3 stub

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use url::Url;

use common::prelude::*;
use drivefix::drive::files::FOLDER_MIME_TYPE;
use drivefix::DriveClient;

/// Query and body of every permission write the stub received
type Writes = Arc<Mutex<Vec<Value>>>;

fn drive_error(status: StatusCode, message: &str) -> Response {
    let body = json!({ "error": { "code": status.as_u16(), "message": message } });
    (status, Json(body)).into_response()
}

async fn get_file(Path(file_id): Path<String>) -> Response {
    if file_id == "missing" {
        return drive_error(StatusCode::NOT_FOUND, "File not found: missing.");
    }
    Json(json!({
        "id": file_id,
        "name": "Plan",
        "mimeType": FOLDER_MIME_TYPE,
        "parents": ["root"],
        "permissions": [
            { "id": "p1", "type": "user", "role": "writer", "emailAddress": "alice@onlab.us" },
            { "id": "p2", "type": "anyone", "role": "reader" }
        ]
    }))
    .into_response()
}

async fn list_files(Query(query): Query<HashMap<String, String>>) -> Response {
    if query.get("q").map(String::as_str) != Some("'R' in parents") {
        return drive_error(StatusCode::BAD_REQUEST, "unexpected query");
    }
    match query.get("pageToken").map(String::as_str) {
        None => Json(json!({
            "nextPageToken": "2",
            "files": [{ "id": "A", "name": "a", "mimeType": FOLDER_MIME_TYPE }]
        }))
        .into_response(),
        Some("2") => Json(json!({
            "files": [{ "id": "B", "name": "b", "mimeType": "text/plain" }]
        }))
        .into_response(),
        Some(_) => drive_error(StatusCode::BAD_REQUEST, "Invalid page token."),
    }
}

async fn delete_permission(Path((_file_id, permission_id)): Path<(String, String)>) -> Response {
    if permission_id == "owner" {
        return drive_error(StatusCode::FORBIDDEN, "The owner of a file cannot be removed.");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_permission(
    State(writes): State<Writes>,
    Path(file_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    writes.lock().await.push(json!({
        "file": file_id,
        "transferOwnership": query.get("transferOwnership"),
        "body": body.clone(),
    }));
    let mut created = body;
    created["id"] = json!("p9");
    Json(created).into_response()
}

async fn update_permission(
    State(writes): State<Writes>,
    Path((file_id, permission_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    writes.lock().await.push(json!({
        "file": file_id,
        "permission": permission_id,
        "body": body.clone(),
    }));
    Json(json!({ "id": permission_id, "type": "user", "role": body["role"] })).into_response()
}

async fn serve(writes: Writes) -> Url {
    let router = Router::new()
        .route("/drive/v3/files", get(list_files))
        .route("/drive/v3/files/:file_id", get(get_file))
        .route("/drive/v3/files/:file_id/permissions", post(create_permission))
        .route(
            "/drive/v3/files/:file_id/permissions/:permission_id",
            delete(delete_permission).patch(update_permission),
        )
        .with_state(writes);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{}/drive/v3/", addr)).unwrap()
}

async fn client() -> (DriveClient, Writes) {
    let writes = Writes::default();
    let remote = serve(writes.clone()).await;
    (DriveClient::new(&remote, "token", 1).unwrap(), writes)
}

#[tokio::test]
async fn test_fetch_node() {
    let (client, _) = client().await;

    let node = client.fetch_node("R").await.unwrap();
    assert_eq!(node.id, "R");
    assert_eq!(node.name, "Plan");
    assert!(node.is_folder());
    assert_eq!(node.parents, vec!["root".to_string()]);
    assert_eq!(node.permissions.len(), 2);
    assert!(node.permissions[0].principal.is_user("alice@onlab.us"));
    assert_eq!(node.permissions[0].role, Role::Writer);
    assert_eq!(node.permissions[1].principal, Principal::Anyone);
}

#[tokio::test]
async fn test_missing_node_is_not_found() {
    let (client, _) = client().await;

    assert_eq!(
        client.fetch_node("missing").await,
        Err(TreeError::NotFound("File not found: missing.".to_string()))
    );
}

#[tokio::test]
async fn test_list_children_follows_page_tokens() {
    let (client, _) = client().await;

    let first = client.list_children("R", None).await.unwrap();
    assert_eq!(first.nodes.len(), 1);
    assert_eq!(first.nodes[0].id, "A");
    assert_eq!(first.next_token(), Some("2"));

    let second = client.list_children("R", Some("2")).await.unwrap();
    assert_eq!(second.nodes[0].id, "B");
    assert!(!second.nodes[0].is_folder());
    assert_eq!(second.next_token(), None);

    assert!(matches!(
        client.list_children("R", Some("stale")).await,
        Err(TreeError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_list_walk_over_http() {
    let (client, _) = client().await;

    let report = walk(&client, "R", &Lister::new(1)).await.unwrap();
    assert_eq!(
        report.lines(),
        vec![
            " Plan (R)".to_string(),
            "- a (A)".to_string(),
            "- b (B)".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_delete_accepts_empty_response() {
    let (client, _) = client().await;

    assert_eq!(client.delete_permission("R", "p1").await, Ok(()));
    assert_eq!(
        client.delete_permission("R", "owner").await,
        Err(TreeError::Rejected {
            status: 403,
            message: "The owner of a file cannot be removed.".to_string(),
        })
    );
}

#[tokio::test]
async fn test_permission_writes() {
    let (client, writes) = client().await;

    client
        .create_permission(
            "R",
            &NewAccessEntry::reader(Principal::user("alice@opennetworking.org")),
        )
        .await
        .unwrap();
    client
        .update_permission_role("R", "p1", Role::Reader)
        .await
        .unwrap();
    client
        .transfer_ownership("R", "admin@opennetworking.org")
        .await
        .unwrap();

    let writes = writes.lock().await;
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0]["transferOwnership"], Value::Null);
    assert_eq!(writes[0]["body"]["type"], "user");
    assert_eq!(writes[0]["body"]["role"], "reader");
    assert_eq!(
        writes[0]["body"]["emailAddress"],
        "alice@opennetworking.org"
    );
    assert_eq!(writes[1]["permission"], "p1");
    assert_eq!(writes[1]["body"], json!({ "role": "reader" }));
    assert_eq!(writes[2]["transferOwnership"], "true");
    assert_eq!(writes[2]["body"]["role"], "owner");
}
