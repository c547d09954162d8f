// Per-widget data binding: real rows or seeded synthetic values
use crate::domain::layout::{ComponentType, DashboardComponent, SimulationVariable};
use crate::domain::source::{Row, numeric_value};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};
use std::hash::{Hash, Hasher};

const SPARKLINE_POINTS: usize = 10;
const LINE_CHART_ROWS: usize = 15;
const TABLE_ROWS: usize = 50;
const GROUP_LIMIT: usize = 10;
const FORECAST_STEPS: usize = 5;
const FORECAST_GROWTH: f64 = 0.05;

/// Materialize the concrete value shape for one component. The shape is the
/// same whether the data is real or synthetic, so the rendering layer is
/// agnostic to data origin. Synthetic randomness is seeded from the component
/// identity, so identical inputs always produce identical output.
pub fn bind(
    component: &DashboardComponent,
    rows: Option<&[Row]>,
    simulations: &[SimulationVariable],
) -> Value {
    match rows {
        Some(rows) if !rows.is_empty() => bind_real(component, rows),
        _ => bind_synthetic(component, simulations),
    }
}

/// Column roles inferred from the declared required fields and the first
/// record. The first numeric field becomes the metric and the first string
/// field the dimension; on irregular datasets this can bind the wrong
/// columns, and no disambiguation exists at this layer.
struct FieldRoles {
    metric: Option<String>,
    dimension: Option<String>,
}

impl FieldRoles {
    fn infer(rows: &[Row], required_fields: &[String]) -> Self {
        let Some(first) = rows.first() else {
            return Self { metric: None, dimension: None };
        };
        let declared: Vec<&String> = if required_fields.is_empty() {
            first.keys().collect()
        } else {
            required_fields.iter().collect()
        };

        let metric = declared
            .iter()
            .find(|field| first.get(field.as_str()).and_then(numeric_value).is_some())
            .map(|field| (*field).clone());
        let dimension = declared
            .iter()
            .find(|field| matches!(first.get(field.as_str()), Some(Value::String(_))))
            .map(|field| (*field).clone())
            .or_else(|| first.keys().next().cloned());

        Self { metric, dimension }
    }
}

fn metric_of(row: &Row, metric: Option<&str>) -> f64 {
    metric
        .and_then(|field| row.get(field))
        .and_then(numeric_value)
        .unwrap_or(0.0)
}

/// Group weight: missing or non-numeric metric values count as 1.
fn weight_of(row: &Row, metric: Option<&str>) -> f64 {
    metric
        .and_then(|field| row.get(field))
        .and_then(numeric_value)
        .unwrap_or(1.0)
}

fn label_of(row: &Row, dimension: Option<&str>) -> Option<String> {
    match dimension.and_then(|field| row.get(field)) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some("true".to_string()),
        _ => None,
    }
}

fn bind_real(component: &DashboardComponent, rows: &[Row]) -> Value {
    let roles = FieldRoles::infer(rows, &component.props.required_fields);
    let metric = roles.metric.as_deref();
    let dimension = roles.dimension.as_deref();

    match &component.kind {
        ComponentType::MetricCard => {
            let sum: f64 = rows.iter().map(|row| metric_of(row, metric)).sum();
            let sparkline: Vec<Value> = rows
                .iter()
                .take(SPARKLINE_POINTS)
                .map(|row| json!({ "value": metric_of(row, metric) }))
                .collect();
            // No historical basis for a trend on a single upload
            json!({ "value": sum, "trend": 0, "sparkline": sparkline })
        }
        ComponentType::LineChart | ComponentType::AreaChart => Value::Array(
            rows.iter()
                .take(LINE_CHART_ROWS)
                .enumerate()
                .map(|(i, row)| {
                    let name =
                        label_of(row, dimension).unwrap_or_else(|| format!("Pt {}", i));
                    json!({ "name": name, "value": metric_of(row, metric) })
                })
                .collect(),
        ),
        ComponentType::BarChart | ComponentType::PieChart => {
            // First-seen group order, truncated to the top entries
            let mut groups: Vec<(String, f64)> = Vec::new();
            for row in rows {
                let key = label_of(row, dimension).unwrap_or_else(|| "Other".to_string());
                let weight = weight_of(row, metric);
                match groups.iter_mut().find(|(name, _)| *name == key) {
                    Some((_, total)) => *total += weight,
                    None => groups.push((key, weight)),
                }
            }
            Value::Array(
                groups
                    .into_iter()
                    .take(GROUP_LIMIT)
                    .map(|(name, value)| json!({ "name": name, "value": value }))
                    .collect(),
            )
        }
        ComponentType::DataTable => Value::Array(
            rows.iter()
                .take(TABLE_ROWS)
                .cloned()
                .map(Value::Object)
                .collect(),
        ),
        ComponentType::PredictiveMonitor => {
            let history: Vec<(String, f64)> = rows
                .iter()
                .take(SPARKLINE_POINTS)
                .enumerate()
                .map(|(i, row)| {
                    let name = label_of(row, dimension).unwrap_or_else(|| format!("D{}", i));
                    (name, metric_of(row, metric))
                })
                .collect();
            let last = history.last().map(|(_, v)| *v).unwrap_or(0.0);
            // Compounding proportional growth, not a statistical model
            let forecast: Vec<(String, f64)> = (0..FORECAST_STEPS)
                .map(|i| {
                    let value = last * (1.0 + FORECAST_GROWTH * (i as f64 + 1.0));
                    (format!("F{}", i + 1), value)
                })
                .collect();
            json!({
                "metric": metric.unwrap_or("Metric"),
                "currentValue": last,
                "predictedValue": forecast.last().map(|(_, v)| *v).unwrap_or(last),
                "confidence": 91,
                "history": series_points(&history),
                "forecast": series_points(&forecast),
                "riskLevel": "low"
            })
        }
        ComponentType::LineageGraph => json!({
            "nodes": [
                { "id": "s1", "label": "Uploaded File", "type": "source", "status": "success", "metadata": format!("SIZE: {} Rows", rows.len()) },
                { "id": "p1", "label": "Schema Inferrer", "type": "process", "status": "success", "metadata": "TYPE: Dynamic" },
                { "id": "p2", "label": "Data Aggregator", "type": "process", "status": "success", "metadata": "ENGINE: In-Process" },
                { "id": "o1", "label": "Visual Output", "type": "output", "status": "success", "metadata": "STATE: Ready" }
            ],
            "edges": [
                { "from": "s1", "to": "p1" },
                { "from": "p1", "to": "p2" },
                { "from": "p2", "to": "o1" }
            ]
        }),
        _ => Value::Array(
            rows.iter()
                .take(SPARKLINE_POINTS)
                .cloned()
                .map(Value::Object)
                .collect(),
        ),
    }
}

fn series_points(points: &[(String, f64)]) -> Vec<Value> {
    points
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect()
}

fn bind_synthetic(component: &DashboardComponent, simulations: &[SimulationVariable]) -> Value {
    let mut rng = ChaCha8Rng::seed_from_u64(component_seed(component));
    let context = component.title.to_lowercase();

    match &component.kind {
        ComponentType::MetricCard => {
            let multiplier = simulation_multiplier(&context, simulations);
            let value = rng.gen_range(0.0..50_000.0_f64).floor() * multiplier;
            let suffix = if context.contains("revenue") { "$" } else { "" };
            let sparkline: Vec<Value> = (0..SPARKLINE_POINTS)
                .map(|_| json!({ "value": rng.gen_range(0.0..100.0) }))
                .collect();
            json!({
                "value": value,
                "trend": 12.5,
                "suffix": suffix,
                "sparkline": sparkline,
                "confidence": 94
            })
        }
        ComponentType::LineChart | ComponentType::AreaChart => Value::Array(
            (0..12)
                .map(|i| json!({ "name": format!("M{}", i + 1), "value": rng.gen_range(0.0..1000.0) }))
                .collect(),
        ),
        ComponentType::BarChart | ComponentType::PieChart => Value::Array(
            ["A", "B", "C"]
                .iter()
                .map(|name| json!({ "name": name, "value": rng.gen_range(0.0..500.0) }))
                .collect(),
        ),
        ComponentType::DataTable => Value::Array(
            (0..SPARKLINE_POINTS)
                .map(|i| {
                    json!({ "id": i, "item": format!("Sample {}", i), "value": rng.gen_range(0.0..100.0) })
                })
                .collect(),
        ),
        ComponentType::PredictiveMonitor => {
            let history: Vec<(String, f64)> = (0..SPARKLINE_POINTS)
                .map(|i| (format!("Day {}", i + 1), 1000.0 + rng.gen_range(0.0..200.0)))
                .collect();
            let last = history.last().map(|(_, v)| *v).unwrap_or(0.0);
            // Additive noise rather than the proportional-growth rule used
            // for real rows
            let forecast: Vec<(String, f64)> = (0..FORECAST_STEPS)
                .map(|i| {
                    let value = last + (i as f64 + 1.0) * (50.0 + rng.gen_range(0.0..50.0));
                    (format!("Day {}", i + 11), value)
                })
                .collect();
            let risk = if rng.gen_range(0.0..1.0) > 0.7 { "medium" } else { "low" };
            json!({
                "metric": "Operational Revenue",
                "currentValue": last,
                "predictedValue": forecast.last().map(|(_, v)| *v).unwrap_or(last),
                "confidence": 88,
                "history": series_points(&history),
                "forecast": series_points(&forecast),
                "riskLevel": risk
            })
        }
        ComponentType::LineageGraph => json!({
            "nodes": [
                { "id": "s1", "label": "Postgres Production", "type": "source", "status": "success", "metadata": "LATENCY: 0.1ms" },
                { "id": "s2", "label": "S3 Raw Storage", "type": "source", "status": "success", "metadata": "SIZE: 1.2TB" },
                { "id": "p1", "label": "Gemini Logic Layer", "type": "process", "status": "success", "metadata": "TOKENS: 4k" },
                { "id": "p2", "label": "Anomaly Detector", "type": "process", "status": "warning", "metadata": "RECALL: 92%" },
                { "id": "o1", "label": "Main Dashboard", "type": "output", "status": "success", "metadata": "FPS: 60" }
            ],
            "edges": [
                { "from": "s1", "to": "p1" },
                { "from": "s2", "to": "p1" },
                { "from": "p1", "to": "p2" },
                { "from": "p2", "to": "o1" }
            ]
        }),
        _ => Value::Array(Vec::new()),
    }
}

fn component_seed(component: &DashboardComponent) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    component.id.hash(&mut hasher);
    component.kind.as_str().hash(&mut hasher);
    hasher.finish()
}

/// Scenario sliders scale synthetic magnitudes when one matches the
/// component context; centered so `current == max/2` means no change.
fn simulation_multiplier(context: &str, simulations: &[SimulationVariable]) -> f64 {
    simulations
        .iter()
        .find(|sim| context.contains(&sim.name.to_lowercase()))
        .map(|sim| {
            if sim.max > 0.0 {
                sim.current / (sim.max / 2.0)
            } else {
                1.0
            }
        })
        .unwrap_or(1.0)
}
