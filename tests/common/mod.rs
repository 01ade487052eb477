//! Shared helpers for integration tests against a mock Outline server.

#![allow(dead_code)]

use outline_core::Client;
use serde_json::{Value, json};
use wiremock::MockServer;
use wiremock::ResponseTemplate;

pub const API_KEY: &str = "api key";

/// Client pointed at the mock server.
pub fn client(server: &MockServer) -> Client {
    Client::new(&server.uri(), API_KEY).expect("mock server URI is a valid base URL")
}

/// `200 {"data": data}`
pub fn data(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

/// `200 {"data": items, "pagination": {...}}`
pub fn page(items: Vec<Value>, offset: usize) -> ResponseTemplate {
    let limit = 25;
    ResponseTemplate::new(200).set_body_json(json!({
        "data": items,
        "pagination": {
            "limit": limit,
            "offset": offset,
            "nextPath": format!("/api/collections.list?limit={limit}&offset={}", offset + limit),
        },
    }))
}

pub fn collection_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "sort": { "field": "title", "direction": "asc" },
        "index": "P",
        "color": "#123123",
        "icon": "string",
        "permission": "read",
        "createdAt": "2019-08-24T14:15:22Z",
        "updatedAt": "2019-08-24T14:15:22Z",
        "deletedAt": null,
    })
}

pub fn document_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "collectionId": "col-1",
        "parentDocumentId": null,
        "title": title,
        "fullWidth": false,
        "emoji": null,
        "text": "# Hello",
        "urlId": "hDYep1TPAM",
        "collaborators": [],
        "pinned": false,
        "template": false,
        "templateId": null,
        "revision": 3,
        "createdAt": "2019-08-24T14:15:22Z",
        "createdBy": { "id": "user-1", "name": "Jane" },
        "updatedAt": "2019-08-24T14:15:22Z",
        "updatedBy": {},
        "publishedAt": "2019-08-24T14:15:22Z",
        "archivedAt": null,
        "deletedAt": null,
    })
}
