// Application state for HTTP handlers
use crate::application::orchestrator::OrchestratorService;
use crate::application::source_detector::SourceDetector;
use crate::domain::layout::{DashboardLayout, SimulationVariable};
use crate::domain::source::DetectedSource;
use tokio::sync::RwLock;

/// One analysis thread: the current layout and detected source. Commits are
/// last-write-wins with no request fencing, so two racing generate requests
/// can interleave; the later commit simply wins. Known correctness risk
/// under rapid-fire requests, kept for compatibility with the session model.
pub struct Session {
    pub layout: Option<DashboardLayout>,
    pub source: Option<DetectedSource>,
    pub simulations: Vec<SimulationVariable>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            layout: None,
            source: None,
            simulations: default_simulations(),
        }
    }
}

fn default_simulations() -> Vec<SimulationVariable> {
    vec![
        SimulationVariable {
            id: "v1".to_string(),
            name: "Advertising Spend".to_string(),
            min: 0.0,
            max: 100_000.0,
            current: 45_000.0,
            unit: Some("$".to_string()),
        },
        SimulationVariable {
            id: "v2".to_string(),
            name: "Churn Rate".to_string(),
            min: 0.0,
            max: 20.0,
            current: 4.2,
            unit: Some("%".to_string()),
        },
        SimulationVariable {
            id: "v3".to_string(),
            name: "Conversion Rate".to_string(),
            min: 0.0,
            max: 100.0,
            current: 3.8,
            unit: Some("%".to_string()),
        },
    ]
}

pub struct AppState {
    pub orchestrator: OrchestratorService,
    pub detector: SourceDetector,
    pub session: RwLock<Session>,
}
