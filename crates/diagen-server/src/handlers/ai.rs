//! AI endpoints: generate, refine, and explain.
//!
//! Provider calls are blocking HTTP requests, so each one runs on the
//! blocking thread pool.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use diagen_ai::{ExplainRequest, GenerateRequest, RefineRequest};
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::credential_overrides;
use crate::state::AppState;

/// Response for generate and refine.
#[derive(Debug, Serialize)]
pub(crate) struct CodeResponse {
    /// Diagram source.
    code: String,
}

/// Response for explain.
#[derive(Debug, Serialize)]
pub(crate) struct ExplanationResponse {
    /// Prose description of the diagram.
    explanation: String,
}

/// Handle POST /api/ai/generate.
pub(crate) async fn generate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<CodeResponse>, ServerError> {
    request.validate()?;
    let overrides = credential_overrides(&headers);
    let orchestrator = Arc::clone(&state.orchestrator);

    let code =
        tokio::task::spawn_blocking(move || orchestrator.generate(&request, &overrides)).await??;
    Ok(Json(CodeResponse { code }))
}

/// Handle POST /api/ai/refine.
pub(crate) async fn refine(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RefineRequest>,
) -> Result<Json<CodeResponse>, ServerError> {
    request.validate()?;
    let overrides = credential_overrides(&headers);
    let orchestrator = Arc::clone(&state.orchestrator);

    let code =
        tokio::task::spawn_blocking(move || orchestrator.refine(&request, &overrides)).await??;
    Ok(Json(CodeResponse { code }))
}

/// Handle POST /api/ai/explain.
pub(crate) async fn explain(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplanationResponse>, ServerError> {
    let overrides = credential_overrides(&headers);
    let orchestrator = Arc::clone(&state.orchestrator);

    let explanation =
        tokio::task::spawn_blocking(move || orchestrator.explain(&request, &overrides)).await??;
    Ok(Json(ExplanationResponse { explanation }))
}
