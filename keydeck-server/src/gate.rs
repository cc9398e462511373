//! Request-interception gate for the protected prefix
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
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use keydeck_keys::session::{SESSION_COOKIE, SESSION_TTL};
use keydeck_keys::SessionCheck;
use tracing::{debug, info};

/// True for `prefix` itself and anything below `prefix/`
pub fn is_protected_path(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Session cookie carrying a validated key
pub fn session_cookie(key: impl Into<String>) -> Cookie<'static> {
    let max_age = time::Duration::seconds(SESSION_TTL.as_secs() as i64);
    Cookie::build((SESSION_COOKIE, key.into()))
        .path("/")
        .max_age(max_age)
        .same_site(SameSite::Lax)
        .build()
}

/// Drop the session cookie, if the client sent one
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

pub fn session_credential(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string())
}

/// Middleware run before routing
///
/// Requests outside the protected prefix pass untouched. Inside it, a
/// missing credential redirects to key entry; a rejected one also clears
/// the cookie.
pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !is_protected_path(request.uri().path(), &state.protected_prefix) {
        return next.run(request).await;
    }

    let credential = session_credential(&jar);
    let check = state.sessions.check(credential.as_deref()).await;

    match check {
        SessionCheck::Valid(_) => next.run(request).await,
        SessionCheck::Rejected(ref reason) => {
            let path = request.uri().path().to_string();
            if check.clears_credential() {
                info!(%path, %reason, "Clearing rejected session credential");
                (clear_session(jar), Redirect::temporary(&state.entry_path)).into_response()
            } else {
                debug!(%path, "No session credential, redirecting to key entry");
                Redirect::temporary(&state.entry_path).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_path_matching() {
        assert!(is_protected_path("/protected", "/protected"));
        assert!(is_protected_path("/protected/", "/protected"));
        assert!(is_protected_path("/protected/reports/1", "/protected"));
        assert!(!is_protected_path("/protectedness", "/protected"));
        assert!(!is_protected_path("/playground", "/protected"));
        assert!(!is_protected_path("/", "/protected"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tvly-dev-abc");
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tvly-dev-abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(1)));
    }
}
