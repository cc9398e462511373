use crate::gate::session_gate;
use crate::handlers::{entry, keys, protected};
use crate::health::health_check;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

/// Build the application router
///
/// The session gate wraps the whole router so protected paths are checked
/// before route matching, including paths with no route of their own.
pub fn build_router(state: AppState) -> Router {
    let protected_root = state.protected_prefix.clone();
    let protected_nested = format!("{}/*rest", protected_root.trim_end_matches('/'));
    let entry_path = state.entry_path.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/api/keys", get(keys::list_keys).post(keys::create_key))
        .route(
            "/api/keys/:id",
            axum::routing::put(keys::update_key).delete(keys::delete_key),
        )
        .route(
            "/api/keys/:id/edit",
            post(keys::start_editing).delete(keys::cancel_editing),
        )
        .route("/api/keys/:id/visibility", post(keys::toggle_visibility))
        .route("/api/keys/:id/copy", post(keys::copy_key))
        .route("/api/session", get(entry::session_status))
        .route("/logout", post(entry::logout))
        .route(&entry_path, get(entry::entry_view).post(entry::submit_key))
        .route(&protected_root, get(protected::protected_view))
        .route(&protected_nested, get(protected::protected_view))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_gate,
        ))
        .with_state(state)
}
