// Dashboard layout domain models
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of columns in the dashboard grid.
pub const GRID_COLUMNS: u64 = 12;

/// Maximum number of components the model may place in one layout.
pub const MAX_COMPONENTS: usize = 6;

/// The registered widget kinds. Unknown kinds from the model are preserved
/// verbatim in `Other` so the rendering layer can show a placeholder for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    LineChart,
    BarChart,
    PieChart,
    AreaChart,
    MetricCard,
    DataTable,
    FilterPanel,
    DateRangePicker,
    StatusPanel,
    CorrelationHeatmap,
    GeographicMap,
    TimelineView,
    InsightCard,
    LineageGraph,
    SimulationPanel,
    PredictiveMonitor,
    Other(String),
}

impl ComponentType {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::LineChart => "LineChart",
            ComponentType::BarChart => "BarChart",
            ComponentType::PieChart => "PieChart",
            ComponentType::AreaChart => "AreaChart",
            ComponentType::MetricCard => "MetricCard",
            ComponentType::DataTable => "DataTable",
            ComponentType::FilterPanel => "FilterPanel",
            ComponentType::DateRangePicker => "DateRangePicker",
            ComponentType::StatusPanel => "StatusPanel",
            ComponentType::CorrelationHeatmap => "CorrelationHeatmap",
            ComponentType::GeographicMap => "GeographicMap",
            ComponentType::TimelineView => "TimelineView",
            ComponentType::InsightCard => "InsightCard",
            ComponentType::LineageGraph => "LineageGraph",
            ComponentType::SimulationPanel => "SimulationPanel",
            ComponentType::PredictiveMonitor => "PredictiveMonitor",
            ComponentType::Other(name) => name,
        }
    }
}

impl From<String> for ComponentType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "LineChart" => ComponentType::LineChart,
            "BarChart" => ComponentType::BarChart,
            "PieChart" => ComponentType::PieChart,
            "AreaChart" => ComponentType::AreaChart,
            "MetricCard" => ComponentType::MetricCard,
            "DataTable" => ComponentType::DataTable,
            "FilterPanel" => ComponentType::FilterPanel,
            "DateRangePicker" => ComponentType::DateRangePicker,
            "StatusPanel" => ComponentType::StatusPanel,
            "CorrelationHeatmap" => ComponentType::CorrelationHeatmap,
            "GeographicMap" => ComponentType::GeographicMap,
            "TimelineView" => ComponentType::TimelineView,
            "InsightCard" => ComponentType::InsightCard,
            "LineageGraph" => ComponentType::LineageGraph,
            "SimulationPanel" => ComponentType::SimulationPanel,
            "PredictiveMonitor" => ComponentType::PredictiveMonitor,
            _ => ComponentType::Other(raw),
        }
    }
}

impl From<ComponentType> for String {
    fn from(kind: ComponentType) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub x: u64,
    pub y: u64,
    pub w: u64,
    pub h: u64,
}

/// Known model-schema props plus a residual map for props this version does
/// not recognize, so future model output survives a round trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_stacked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_donut: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_legend: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub title: String,
    pub grid_config: GridConfig,
    #[serde(default)]
    pub props: ComponentProps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Anomaly,
    Trend,
    Correlation,
    Outlier,
    Prediction,
    Opportunity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// Generated claim with its audit trail. Confidence, reasoning and method are
/// schema-required so every insight stays traceable to the source schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartInsight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub title: String,
    pub summary: String,
    pub impact: Impact,
    pub confidence: f64,
    pub reasoning: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_component_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub id: String,
    pub name: String,
    pub version: u64,
    pub components: Vec<DashboardComponent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<SmartInsight>,
}

/// Scenario slider consumed by synthetic data binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationVariable {
    pub id: String,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub current: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Widget interaction forwarded to the model on drilldown-style requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionContext {
    pub component_id: String,
    pub element_label: String,
    pub element_value: Value,
    pub action: String,
}
