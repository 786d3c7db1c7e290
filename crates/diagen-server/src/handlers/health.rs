//! Service info and health endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// Handle GET /.
pub(crate) async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "diagen AI diagram API",
        "version": state.version,
    }))
}

/// Handle GET /health.
pub(crate) async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::testing::{TestApp, get_json};

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new("unused");
        let (status, body) = get_json(app.router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_root_reports_version() {
        let app = TestApp::new("unused");
        let (status, body) = get_json(app.router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], "0.0.0-test");
    }
}
