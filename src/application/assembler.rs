// Layout validation, versioning, and the canonical error layout
use crate::domain::layout::{
    ComponentProps, ComponentType, DashboardComponent, DashboardLayout, GRID_COLUMNS, GridConfig,
    MAX_COMPONENTS, SmartInsight,
};
use serde_json::Value;

/// Why a generation cycle failed, for error-layout wording. Chosen by the
/// caller from the invoker/healer error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimitExhausted,
    TrustViolation,
}

/// Validate a healed candidate into a layout, assigning the next version.
/// Any structural failure produces the canonical error layout instead, so
/// downstream always receives a fully valid layout. Version numbers stay
/// monotonic across a session regardless of success or failure.
pub fn assemble(candidate: &Value, previous_version: u64, failure: FailureKind) -> DashboardLayout {
    let version = previous_version + 1;
    match validate(candidate) {
        Some(mut layout) => {
            layout.version = version;
            layout
        }
        None => {
            tracing::warn!("Layout candidate failed structural validation");
            error_layout(failure, version)
        }
    }
}

fn validate(candidate: &Value) -> Option<DashboardLayout> {
    let object = candidate.as_object()?;
    let id = object.get("id")?.as_str()?.to_string();
    let name = object.get("name")?.as_str()?.to_string();
    let raw_components = object.get("components")?.as_array()?;
    if raw_components.len() > MAX_COMPONENTS {
        return None;
    }

    let mut components = Vec::with_capacity(raw_components.len());
    for raw in raw_components {
        // Deserialization enforces id/type/title and a fully numeric,
        // non-negative gridConfig with all four fields present.
        let component: DashboardComponent = serde_json::from_value(raw.clone()).ok()?;
        if component.grid_config.w > GRID_COLUMNS {
            return None;
        }
        components.push(component);
    }

    // Insights are advisory: drop ones that fail to parse rather than
    // rejecting the whole layout.
    let insights = object
        .get("insights")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|raw| serde_json::from_value::<SmartInsight>(raw.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    Some(DashboardLayout {
        id,
        name,
        version: 0,
        components,
        insights,
    })
}

/// The single canonical degraded layout: one full-width InsightCard whose
/// summary tells the user whether they hit the quota or a data-trust halt.
pub fn error_layout(failure: FailureKind, version: u64) -> DashboardLayout {
    let (name, title, summary, suggested_action) = match failure {
        FailureKind::RateLimitExhausted => (
            "API Rate Limit Exceeded",
            "Quota Limit Reached",
            "The Gemini API rate limit has been reached. Please wait a few seconds or use your own paid API key to continue high-frequency analysis.",
            "Switch to Personal API Key",
        ),
        FailureKind::TrustViolation => (
            "Data Trust Violation",
            "Validation Halt",
            "Analysis aborted to maintain data integrity. The provided input does not contain the verified fields required for this operation.",
            "Clarify Data Requirements",
        ),
    };

    DashboardLayout {
        id: "error".to_string(),
        name: name.to_string(),
        version,
        components: vec![DashboardComponent {
            id: "err".to_string(),
            kind: ComponentType::InsightCard,
            title: title.to_string(),
            grid_config: GridConfig { x: 0, y: 0, w: 12, h: 4 },
            props: ComponentProps {
                summary: Some(summary.to_string()),
                impact: Some("high".to_string()),
                suggested_action: Some(suggested_action.to_string()),
                required_fields: vec!["Validated Source".to_string()],
                ..ComponentProps::default()
            },
        }],
        insights: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_candidate() -> Value {
        json!({
            "id": "d1",
            "name": "Sales Overview",
            "components": [
                {
                    "id": "c1",
                    "type": "BarChart",
                    "title": "Revenue by Region",
                    "gridConfig": { "x": 0, "y": 0, "w": 6, "h": 4 },
                    "props": { "requiredFields": ["region", "amt"] }
                }
            ],
            "insights": [
                {
                    "id": "i1",
                    "type": "trend",
                    "title": "Upward trend",
                    "summary": "Revenue grows monthly",
                    "impact": "high",
                    "confidence": 0.8,
                    "reasoning": "Monotonic increase across amt",
                    "method": "Linear Regression"
                }
            ]
        })
    }

    #[test]
    fn test_valid_candidate_assembles() {
        let layout = assemble(&valid_candidate(), 4, FailureKind::TrustViolation);
        assert_eq!(layout.version, 5);
        assert_eq!(layout.name, "Sales Overview");
        assert_eq!(layout.components.len(), 1);
        assert_eq!(layout.insights.len(), 1);
        assert_eq!(layout.components[0].kind, ComponentType::BarChart);
    }

    #[test]
    fn test_missing_components_yields_error_layout() {
        let layout = assemble(
            &json!({ "id": "d1", "name": "No Widgets" }),
            0,
            FailureKind::TrustViolation,
        );
        assert_eq!(layout.version, 1);
        assert_eq!(layout.components.len(), 1);
        assert_eq!(layout.components[0].kind, ComponentType::InsightCard);
        assert_eq!(
            layout.components[0].grid_config,
            GridConfig { x: 0, y: 0, w: 12, h: 4 }
        );
    }

    #[test]
    fn test_sentinel_yields_error_layout() {
        let layout = assemble(&json!({}), 2, FailureKind::TrustViolation);
        assert_eq!(layout.id, "error");
        assert_eq!(layout.version, 3);
    }

    #[test]
    fn test_rate_limit_wording() {
        let layout = error_layout(FailureKind::RateLimitExhausted, 1);
        assert_eq!(layout.name, "API Rate Limit Exceeded");
        let summary = layout.components[0].props.summary.as_deref().unwrap();
        assert!(summary.contains("rate limit"));
    }

    #[test]
    fn test_too_many_components_rejected() {
        let component = json!({
            "id": "c",
            "type": "MetricCard",
            "title": "KPI",
            "gridConfig": { "x": 0, "y": 0, "w": 3, "h": 2 }
        });
        let candidate = json!({
            "id": "d1",
            "name": "Crowded",
            "components": vec![component; 7]
        });
        let layout = assemble(&candidate, 0, FailureKind::TrustViolation);
        assert_eq!(layout.id, "error");
    }

    #[test]
    fn test_component_wider_than_grid_rejected() {
        let candidate = json!({
            "id": "d1",
            "name": "Too Wide",
            "components": [{
                "id": "c1",
                "type": "DataTable",
                "title": "Rows",
                "gridConfig": { "x": 0, "y": 0, "w": 14, "h": 6 }
            }]
        });
        let layout = assemble(&candidate, 0, FailureKind::TrustViolation);
        assert_eq!(layout.id, "error");
    }

    #[test]
    fn test_component_missing_grid_field_rejected() {
        let candidate = json!({
            "id": "d1",
            "name": "Broken Grid",
            "components": [{
                "id": "c1",
                "type": "LineChart",
                "title": "Trend",
                "gridConfig": { "x": 0, "y": 0, "w": 6 }
            }]
        });
        let layout = assemble(&candidate, 0, FailureKind::TrustViolation);
        assert_eq!(layout.id, "error");
    }

    #[test]
    fn test_unknown_component_kind_passes_through() {
        let candidate = json!({
            "id": "d1",
            "name": "Novel",
            "components": [{
                "id": "c1",
                "type": "QuantumPlot",
                "title": "Experimental",
                "gridConfig": { "x": 0, "y": 0, "w": 6, "h": 4 }
            }]
        });
        let layout = assemble(&candidate, 0, FailureKind::TrustViolation);
        assert_eq!(
            layout.components[0].kind,
            ComponentType::Other("QuantumPlot".to_string())
        );
    }

    #[test]
    fn test_malformed_insight_dropped_not_fatal() {
        let mut candidate = valid_candidate();
        candidate["insights"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "id": "i2", "type": "trend" }));
        let layout = assemble(&candidate, 0, FailureKind::TrustViolation);
        assert_eq!(layout.name, "Sales Overview");
        assert_eq!(layout.insights.len(), 1);
    }

    #[test]
    fn test_version_monotonic_across_failures() {
        let mut version = 0;
        for i in 0..4 {
            let layout = if i % 2 == 0 {
                assemble(&valid_candidate(), version, FailureKind::TrustViolation)
            } else {
                assemble(&json!({}), version, FailureKind::RateLimitExhausted)
            };
            assert_eq!(layout.version, version + 1);
            version = layout.version;
        }
    }
}
