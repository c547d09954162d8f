// HTTP request handlers
use crate::application::orchestrator::GenerateRequest;
use crate::application::source_detector::ArtifactInput;
use crate::domain::layout::{DashboardLayout, InteractionContext};
use crate::domain::source::{DetectedSource, SourceKind};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
pub struct DetectParams {
    /// Filename of an uploaded artifact; absent for plain-text input.
    pub name: Option<String>,
}

/// Detect a data source from an uploaded artifact or a text query and commit
/// it as the session's current source. Detection never fails; unmatched
/// input comes back as an `unknown` descriptor.
pub async fn detect_source(
    Query(params): Query<DetectParams>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<DetectedSource> {
    let source = match &params.name {
        Some(name) => {
            state
                .detector
                .detect(ArtifactInput::File { name, bytes: &body })
                .await
        }
        None => {
            let text = String::from_utf8_lossy(&body);
            state.detector.detect(ArtifactInput::Text(&text)).await
        }
    };

    // Last-write-wins commit; a racing request may overwrite this
    state.session.write().await.source = Some(source.clone());
    tracing::debug!("Detected source {:?} ({})", source.kind, source.label);
    Json(source)
}

#[derive(Deserialize, Default)]
pub struct GenerateBody {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub regenerate: bool,
    #[serde(default)]
    pub interaction: Option<InteractionContext>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub layout: DashboardLayout,
    pub data: Map<String, Value>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Run one orchestration cycle against the session and commit its layout.
/// Always returns a structurally valid layout; failures surface as the
/// canonical degraded layout, never as an error status.
pub async fn generate_dashboard(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateBody>,
) -> Json<GenerateResponse> {
    // A bare query can itself identify a hosted source (a pasted sheet URL)
    let query_source = {
        let session = state.session.read().await;
        if session.source.is_none() && !body.query.trim().is_empty() {
            let detected = state.detector.detect(ArtifactInput::Text(&body.query)).await;
            (detected.kind != SourceKind::Unknown).then_some(detected)
        } else {
            None
        }
    };
    if let Some(detected) = &query_source {
        state.session.write().await.source = Some(detected.clone());
    }

    let request = GenerateRequest {
        query: body.query,
        regenerate: body.regenerate,
        interaction: body.interaction,
    };

    let (current_layout, source, simulations) = {
        let session = state.session.read().await;
        (
            session.layout.clone(),
            session.source.clone(),
            session.simulations.clone(),
        )
    };

    let generated = state
        .orchestrator
        .generate(
            &request,
            current_layout.as_ref(),
            source.as_ref(),
            &simulations,
        )
        .await;

    // Last-write-wins commit; a racing request may overwrite this
    state.session.write().await.layout = Some(generated.layout.clone());

    Json(GenerateResponse {
        layout: generated.layout,
        data: generated.data,
        generated_at: chrono::Utc::now(),
    })
}
