//! Protected view, reachable only through the session gate

use axum::http::Uri;
use axum::Json;
use serde_json::json;

pub async fn protected_view(uri: Uri) -> Json<serde_json::Value> {
    Json(json!({
        "view": "protected",
        "path": uri.path(),
        "message": "This page is protected by API key validation",
    }))
}
