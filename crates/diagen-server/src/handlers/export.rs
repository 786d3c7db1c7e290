//! Export endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use diagen_export::ExportFormat;
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Query parameters for POST /api/export.
#[derive(Debug, Deserialize)]
pub(crate) struct ExportQuery {
    /// `svg`, `png`, or `pdf`.
    #[serde(default = "default_format")]
    format: String,
    /// PNG scale factor override.
    scale: Option<u32>,
}

fn default_format() -> String {
    "svg".to_owned()
}

/// Body of POST /api/export.
#[derive(Debug, Deserialize)]
pub(crate) struct ExportBody {
    /// Used for the download filename.
    title: String,
    /// Diagram source.
    code: String,
}

/// Handle POST /api/export.
pub(crate) async fn export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
    Json(body): Json<ExportBody>,
) -> Result<Response, ServerError> {
    let format: ExportFormat = query.format.parse()?;
    let artifact = state
        .exporter
        .export(&body.code, format, query.scale)
        .await?;

    let filename = artifact.attachment_filename(&body.title);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(artifact.media_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}

#[cfg(all(test, unix))]
mod tests {
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::testing::{TestApp, post_json, post_raw};

    #[tokio::test]
    async fn test_export_svg_attachment() {
        let app = TestApp::new("unused");
        let response = post_raw(
            app.router(),
            "/api/export?format=svg",
            json!({"title": "Login flow", "code": "<svg/>"}),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("content-type"), "image/svg+xml");
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"Login flow.svg\""
        );
        assert_eq!(response.body, b"<svg/>");
    }

    #[tokio::test]
    async fn test_export_unknown_format() {
        let app = TestApp::new("unused");
        let (status, body) = post_json(
            app.router(),
            "/api/export?format=gif",
            &[],
            json!({"title": "t", "code": "graph TD"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "Unsupported format"}));
    }

    #[tokio::test]
    async fn test_export_rejects_out_of_range_scale() {
        let app = TestApp::new("unused");
        for uri in ["/api/export?format=png&scale=0", "/api/export?format=png&scale=4000000000"] {
            let (status, body) = post_json(
                app.router(),
                uri,
                &[],
                json!({"title": "t", "code": "graph TD"}),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(
                body["detail"]
                    .as_str()
                    .unwrap()
                    .starts_with("Scale must be between 1 and 10")
            );
        }
    }

    #[tokio::test]
    async fn test_export_pdf_without_capability() {
        let app = TestApp::new("unused");
        let (status, body) = post_json(
            app.router(),
            "/api/export?format=pdf",
            &[],
            json!({"title": "t", "code": "graph TD"}),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(body["detail"].as_str().unwrap().starts_with("PDF export requires"));
    }
}
