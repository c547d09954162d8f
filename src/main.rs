// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::application::model_gateway::ModelGateway;
use crate::application::orchestrator::OrchestratorService;
use crate::application::source_detector::SourceDetector;
use crate::infrastructure::config::{env_credential_provider, load_model_config};
use crate::infrastructure::gemini_gateway::GeminiGateway;
use crate::presentation::app_state::{AppState, Session};
use crate::presentation::handlers::{detect_source, generate_dashboard, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let model_config = load_model_config()?;
    let credentials = env_credential_provider(model_config.model.api_key_env.clone());

    // Create the model gateway (infrastructure layer)
    let gateway: Arc<dyn ModelGateway> =
        Arc::new(GeminiGateway::new(model_config.model, credentials));

    // Create services (application layer)
    let detector = SourceDetector::new(gateway.clone());
    let orchestrator = OrchestratorService::new(gateway);

    // Create application state
    let state = Arc::new(AppState {
        orchestrator,
        detector,
        session: RwLock::new(Session::default()),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/sources/detect", post(detect_source))
        .route("/dashboards/generate", post(generate_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    println!("Starting dashboard-architect service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
