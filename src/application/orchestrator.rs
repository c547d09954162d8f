// Orchestrator service - generative layout pipeline (invoke, heal, assemble, bind)
use crate::application::assembler::{FailureKind, assemble, error_layout};
use crate::application::binder;
use crate::application::healer::heal;
use crate::application::model_gateway::{LayoutRequest, ModelGateway};
use crate::application::retry::invoke_with_retry;
use crate::domain::layout::{
    DashboardLayout, InteractionContext, SimulationVariable,
};
use crate::domain::registry::registry_summary;
use crate::domain::source::DetectedSource;
use serde_json::{Map, Value, json};
use std::sync::Arc;

const ARCHITECT_SYSTEM_PROMPT: &str = "\
Act as the Architect in STRICT DATA-TRUST MODE.

CORE MANDATE:
1. Only orchestrate components that can be directly populated by the provided data source.
2. ZERO SYNTHETIC DATA: Do not suggest metrics, trends, or insights that are not explicitly present or mathematically derivable from the source schema.
3. If data is insufficient for a requested analysis, suggest a 'DataRequirementCard' to inform the user what is missing.
4. Max 6 components per layout.
5. Return ONLY raw JSON. No markdown wrappers.
6. Every layout must include an 'insights' array with:
   - confidence: (0-1 based strictly on data volume/quality)
   - reasoning: (traceable logic back to source fields)
   - method: (mathematical/statistical approach used)

HIGH-TRUST COMPONENTS:
- Use 'LineageGraph' whenever the user asks about data provenance, sources, transparency, or how data is being processed.
- Use 'PredictiveMonitor' whenever the user asks for forecasts, future trends, or risk assessments.

DIVERSITY & VARIATION MANDATE:
1. When generating a layout, explore alternate visualization choices.
2. DYNAMIC GRID ROTATION: Avoid standard top-down stack. Vary gridConfig (x, y, w, h).
3. If 'EXISTING_LAYOUT' is provided, you MUST significantly alter the visual structure.";

const INITIAL_TEMPERATURE: f32 = 0.1;
const REGENERATE_TEMPERATURE: f32 = 0.4;

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub query: String,
    pub regenerate: bool,
    pub interaction: Option<InteractionContext>,
}

/// One completed generation cycle: the validated, versioned layout plus the
/// materialized data for each of its components, keyed by component id.
#[derive(Debug, Clone)]
pub struct GeneratedDashboard {
    pub layout: DashboardLayout,
    pub data: Map<String, Value>,
}

#[derive(Clone)]
pub struct OrchestratorService {
    gateway: Arc<dyn ModelGateway>,
}

impl OrchestratorService {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Run one full orchestration cycle. Every failure path resolves to a
    /// valid (possibly degraded) layout; this never returns an error.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
        current_layout: Option<&DashboardLayout>,
        source: Option<&DetectedSource>,
        simulations: &[SimulationVariable],
    ) -> GeneratedDashboard {
        let previous_version = current_layout.map(|l| l.version).unwrap_or(0);
        let prompt = compose_prompt(request, current_layout, source);
        let layout_request = LayoutRequest {
            prompt,
            temperature: if request.regenerate {
                REGENERATE_TEMPERATURE
            } else {
                INITIAL_TEMPERATURE
            },
        };

        let gateway = self.gateway.clone();
        let invocation = invoke_with_retry(move || {
            let gateway = gateway.clone();
            let request = layout_request.clone();
            async move { gateway.generate_layout(&request).await }
        })
        .await;

        let layout = match invocation {
            Ok(raw) => {
                let healed = heal(&raw);
                assemble(&healed, previous_version, FailureKind::TrustViolation)
            }
            Err(err) => {
                tracing::error!("Orchestration failed after retries: {}", err);
                let failure = if err.is_rate_limited() {
                    FailureKind::RateLimitExhausted
                } else {
                    FailureKind::TrustViolation
                };
                error_layout(failure, previous_version + 1)
            }
        };

        // Bind one component at a time, in declaration order. Sequential by
        // design: components become renderable progressively and attachment
        // order stays deterministic.
        let rows = source.and_then(|s| s.rows.as_deref());
        let mut data = Map::new();
        for component in &layout.components {
            let bound = binder::bind(component, rows, simulations);
            data.insert(component.id.clone(), bound);
        }

        tracing::debug!(
            "Generated layout {} v{} with {} components",
            layout.id,
            layout.version,
            layout.components.len()
        );
        GeneratedDashboard { layout, data }
    }
}

fn compose_prompt(
    request: &GenerateRequest,
    current_layout: Option<&DashboardLayout>,
    source: Option<&DetectedSource>,
) -> String {
    let query: &str = if request.query.trim().is_empty() {
        "Data analysis workspace"
    } else {
        &request.query
    };
    let mode = if request.regenerate {
        "REGENERATE_DIVERSITY_EXPLORATION"
    } else {
        "INITIAL_ORCHESTRATION"
    };
    let source_context = source
        .map(|s| {
            json!({ "type": s.kind, "label": s.label, "hints": s.hints }).to_string()
        })
        .unwrap_or_else(|| "NO SOURCE PROVIDED - REQUEST DATA".to_string());
    let existing_layout = current_layout
        .map(|layout| {
            let summary: Vec<Value> = layout
                .components
                .iter()
                .map(|c| {
                    json!({ "id": c.id, "type": c.kind, "title": c.title, "pos": c.grid_config })
                })
                .collect();
            Value::Array(summary).to_string()
        })
        .unwrap_or_else(|| "None".to_string());
    let event = request
        .interaction
        .as_ref()
        .and_then(|i| serde_json::to_string(i).ok())
        .unwrap_or_else(|| "None".to_string());

    format!(
        "{}\nAVAILABLE_COMPONENTS:\n{}\nREQUEST: {}\nMODE: {}\nDATA_SOURCE_CONTEXT: {}\nEXISTING_LAYOUT: {}\nEVENT: {}",
        ARCHITECT_SYSTEM_PROMPT,
        registry_summary(),
        query,
        mode,
        source_context,
        existing_layout,
        event
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::model_gateway::{ImageAnalysis, ModelError};
    use crate::domain::layout::ComponentType;
    use crate::domain::source::{SourceKind, infer_schema};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedGateway {
        replies: Vec<Result<String, ()>>,
        calls: AtomicU32,
        rate_limited: bool,
    }

    impl ScriptedGateway {
        fn ok(reply: &str) -> Self {
            Self {
                replies: vec![Ok(reply.to_string())],
                calls: AtomicU32::new(0),
                rate_limited: false,
            }
        }

        fn always_failing(rate_limited: bool) -> Self {
            Self { replies: Vec::new(), calls: AtomicU32::new(0), rate_limited }
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn generate_layout(&self, _request: &LayoutRequest) -> Result<String, ModelError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            match self.replies.get(call) {
                Some(Ok(reply)) => Ok(reply.clone()),
                _ if self.rate_limited => {
                    Err(ModelError::RateLimited("RESOURCE_EXHAUSTED".to_string()))
                }
                _ => Err(ModelError::Network("unreachable".to_string())),
            }
        }

        async fn analyze_image(
            &self,
            _bytes: &[u8],
            _mime: &str,
        ) -> Result<ImageAnalysis, ModelError> {
            Err(ModelError::Network("not under test".to_string()))
        }
    }

    const VALID_REPLY: &str = r#"{
        "id": "d1",
        "name": "Sales Overview",
        "components": [
            {
                "id": "c1",
                "type": "BarChart",
                "title": "Revenue by Region",
                "gridConfig": { "x": 0, "y": 0, "w": 6, "h": 4 },
                "props": { "requiredFields": ["region", "amt"] }
            },
            {
                "id": "c2",
                "type": "MetricCard",
                "title": "Total Revenue",
                "gridConfig": { "x": 6, "y": 0, "w": 3, "h": 2 },
                "props": { "requiredFields": ["amt"] }
            }
        ]
    }"#;

    fn sales_source() -> DetectedSource {
        let rows: Vec<_> = serde_json::json!([
            { "region": "A", "amt": 10 },
            { "region": "A", "amt": 5 },
            { "region": "B", "amt": 3 }
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        let hints = infer_schema(&rows);
        DetectedSource {
            kind: SourceKind::Csv,
            label: "sales.csv".to_string(),
            rows: Some(rows),
            hints,
        }
    }

    #[tokio::test]
    async fn test_generate_binds_each_component_in_order() {
        let service = OrchestratorService::new(Arc::new(ScriptedGateway::ok(VALID_REPLY)));
        let result = service
            .generate(&GenerateRequest::default(), None, Some(&sales_source()), &[])
            .await;

        assert_eq!(result.layout.version, 1);
        assert_eq!(result.layout.components.len(), 2);
        assert_eq!(
            result.data["c1"],
            serde_json::json!([
                { "name": "A", "value": 15.0 },
                { "name": "B", "value": 3.0 }
            ])
        );
        assert_eq!(result.data["c2"]["value"], serde_json::json!(18.0));
    }

    #[tokio::test]
    async fn test_generate_heals_truncated_reply() {
        let truncated = r#"{"id":"d1","name":"Cut Short","components":[{"id":"c1","type":"DataTable","title":"Rows","gridConfig":{"x":0,"y":0,"w":12,"h":6},"props":{"requiredFields":["region"]}}"#;
        let service = OrchestratorService::new(Arc::new(ScriptedGateway::ok(truncated)));
        let result = service
            .generate(&GenerateRequest::default(), None, None, &[])
            .await;

        assert_eq!(result.layout.name, "Cut Short");
        assert_eq!(result.layout.components[0].kind, ComponentType::DataTable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_yields_quota_error_layout() {
        let gateway = Arc::new(ScriptedGateway::always_failing(true));
        let service = OrchestratorService::new(gateway.clone());
        let result = service
            .generate(&GenerateRequest::default(), None, None, &[])
            .await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.layout.name, "API Rate Limit Exceeded");
        assert_eq!(result.layout.components[0].kind, ComponentType::InsightCard);
        // The error layout still gets data bound for its single component
        assert!(result.data.contains_key("err"));
    }

    #[tokio::test]
    async fn test_network_failure_yields_trust_error_layout_without_retry() {
        let gateway = Arc::new(ScriptedGateway::always_failing(false));
        let service = OrchestratorService::new(gateway.clone());
        let result = service
            .generate(&GenerateRequest::default(), None, None, &[])
            .await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.layout.name, "Data Trust Violation");
    }

    #[tokio::test]
    async fn test_garbage_reply_yields_trust_error_layout() {
        let service =
            OrchestratorService::new(Arc::new(ScriptedGateway::ok("I cannot help with that")));
        let result = service
            .generate(&GenerateRequest::default(), None, None, &[])
            .await;
        assert_eq!(result.layout.name, "Data Trust Violation");
        assert_eq!(result.layout.version, 1);
    }

    #[tokio::test]
    async fn test_version_continues_from_current_layout() {
        let service = OrchestratorService::new(Arc::new(ScriptedGateway::ok(VALID_REPLY)));
        let first = service
            .generate(&GenerateRequest::default(), None, None, &[])
            .await;

        let service = OrchestratorService::new(Arc::new(ScriptedGateway::ok(VALID_REPLY)));
        let second = service
            .generate(
                &GenerateRequest { regenerate: true, ..GenerateRequest::default() },
                Some(&first.layout),
                None,
                &[],
            )
            .await;
        assert_eq!(second.layout.version, first.layout.version + 1);
    }

    #[test]
    fn test_compose_prompt_sections() {
        let request = GenerateRequest {
            query: "Show revenue trends".to_string(),
            regenerate: true,
            interaction: None,
        };
        let source = sales_source();
        let prompt = compose_prompt(&request, None, Some(&source));

        assert!(prompt.contains("REQUEST: Show revenue trends"));
        assert!(prompt.contains("MODE: REGENERATE_DIVERSITY_EXPLORATION"));
        assert!(prompt.contains("\"label\":\"sales.csv\""));
        assert!(prompt.contains("EXISTING_LAYOUT: None"));
        assert!(prompt.contains("EVENT: None"));
    }

    #[test]
    fn test_compose_prompt_defaults_empty_query() {
        let prompt = compose_prompt(&GenerateRequest::default(), None, None);
        assert!(prompt.contains("REQUEST: Data analysis workspace"));
        assert!(prompt.contains("MODE: INITIAL_ORCHESTRATION"));
        assert!(prompt.contains("NO SOURCE PROVIDED - REQUEST DATA"));
    }
}
