//! Key entry, session mount-check and logout
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


use crate::gate::{clear_session, session_cookie, session_credential};
use crate::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use keydeck_keys::{CredentialAction, DelayedRedirect, EntryState, KeyEntry, SessionCheck};
use keydeck_types::Notification;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub state: EntryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<DelayedRedirect>,
}

/// Answer to the protected view's mount-check
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// The key-entry view; a landing point for gate redirects
pub async fn entry_view(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "view": "key_entry",
        "state": EntryState::Idle,
        "protected_path": state.protected_prefix,
    }))
}

/// Validate a submitted key and issue the session credential
pub async fn submit_key(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<EntryRequest>,
) -> Response {
    let mut entry = KeyEntry::new(state.sessions.clone(), state.protected_prefix.clone());
    let issuance = entry.submit(&request.key).await;

    let jar = match issuance.credential {
        CredentialAction::Keep => jar,
        CredentialAction::Set(key) => jar.add(session_cookie(key)),
        CredentialAction::Clear => clear_session(jar),
    };

    let body = EntryResponse {
        state: issuance.outcome,
        notification: issuance.notification,
        redirect: issuance.redirect,
    };
    (jar, Json(body)).into_response()
}

/// Revalidate the stored credential when the protected view mounts
pub async fn session_status(State(state): State<AppState>, jar: CookieJar) -> Response {
    let credential = session_credential(&jar);
    let check = state.sessions.check(credential.as_deref()).await;

    if let SessionCheck::Valid(_) = check {
        return Json(SessionStatus {
            valid: true,
            redirect: None,
        })
        .into_response();
    }

    let body = Json(SessionStatus {
        valid: false,
        redirect: Some(state.entry_path.clone()),
    });
    if check.clears_credential() {
        (clear_session(jar), body).into_response()
    } else {
        body.into_response()
    }
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    info!("Session credential cleared by logout");
    (clear_session(jar), Redirect::to(&state.entry_path)).into_response()
}
