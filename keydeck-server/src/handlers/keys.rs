//! Dashboard endpoints for the API key table
//!
//! Store failures come back as a notification in a 200 response. Only an
//! id that is not in the dashboard's list answers 404.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keydeck_keys::{Clipboard, CreateOutcome, DeleteOutcome, KeyRow, UpdateOutcome};
use keydeck_types::{ApiKeyChanges, KeyId, KeyType, Notification};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct KeyListResponse {
    pub keys: Vec<KeyRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to a row action
#[derive(Debug, Default, Serialize)]
pub struct KeyActionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub key_type: KeyType,
}

/// Clipboard that hands the copied text back to the HTTP client
#[derive(Debug, Default)]
struct ResponseClipboard {
    text: Option<String>,
}

impl Clipboard for ResponseClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

fn unknown_key(id: &KeyId) -> Response {
    debug!(key_id = %id, "Key not in dashboard list");
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Unknown API key {}", id) })),
    )
        .into_response()
}

pub async fn list_keys(State(state): State<AppState>) -> Json<KeyListResponse> {
    let mut dashboard = state.dashboard.lock().await;
    let error = dashboard.list().await.err().map(|e| e.to_string());
    Json(KeyListResponse {
        keys: dashboard.rows(),
        error,
    })
}

pub async fn create_key(
    State(state): State<AppState>,
    Json(request): Json<CreateKeyRequest>,
) -> Response {
    let mut dashboard = state.dashboard.lock().await;
    match dashboard.create(&request.name, request.key_type).await {
        CreateOutcome::Created { record, notification } => (
            StatusCode::CREATED,
            Json(KeyActionResponse {
                key: dashboard.row(&record.id),
                notification: Some(notification),
            }),
        )
            .into_response(),
        CreateOutcome::Skipped => Json(KeyActionResponse::default()).into_response(),
        CreateOutcome::Failed(notification) => Json(KeyActionResponse {
            key: None,
            notification: Some(notification),
        })
        .into_response(),
    }
}

pub async fn update_key(
    State(state): State<AppState>,
    Path(id): Path<KeyId>,
    Json(changes): Json<ApiKeyChanges>,
) -> Json<KeyActionResponse> {
    let mut dashboard = state.dashboard.lock().await;
    let response = match dashboard.update(&id, changes).await {
        UpdateOutcome::Updated(record) => KeyActionResponse {
            key: dashboard.row(&record.id),
            notification: None,
        },
        UpdateOutcome::Skipped => KeyActionResponse::default(),
        UpdateOutcome::Failed(notification) => KeyActionResponse {
            key: None,
            notification: Some(notification),
        },
    };
    Json(response)
}

pub async fn delete_key(
    State(state): State<AppState>,
    Path(id): Path<KeyId>,
) -> Json<KeyActionResponse> {
    let mut dashboard = state.dashboard.lock().await;
    let notification = match dashboard.delete(&id).await {
        DeleteOutcome::Deleted(notification) | DeleteOutcome::Failed(notification) => {
            notification
        }
    };
    Json(KeyActionResponse {
        key: None,
        notification: Some(notification),
    })
}

pub async fn start_editing(State(state): State<AppState>, Path(id): Path<KeyId>) -> Response {
    let mut dashboard = state.dashboard.lock().await;
    match dashboard.start_editing(&id) {
        Some(session) => Json(session.clone()).into_response(),
        None => unknown_key(&id),
    }
}

pub async fn cancel_editing(State(state): State<AppState>) -> StatusCode {
    state.dashboard.lock().await.cancel_editing();
    StatusCode::NO_CONTENT
}

pub async fn toggle_visibility(State(state): State<AppState>, Path(id): Path<KeyId>) -> Response {
    let mut dashboard = state.dashboard.lock().await;
    if dashboard.toggle_visibility(&id).is_none() {
        return unknown_key(&id);
    }
    Json(KeyActionResponse {
        key: dashboard.row(&id),
        notification: None,
    })
    .into_response()
}

pub async fn copy_key(State(state): State<AppState>, Path(id): Path<KeyId>) -> Response {
    let dashboard = state.dashboard.lock().await;
    let mut clipboard = ResponseClipboard::default();
    let notification = dashboard.copy_key(&id, &mut clipboard);
    match clipboard.text {
        Some(text) => Json(json!({ "text": text, "notification": notification })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "notification": notification })))
            .into_response(),
    }
}
