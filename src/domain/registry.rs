// Registered component catalog surfaced to the model
use crate::domain::layout::ComponentType;

pub struct RegisteredComponent {
    pub kind: ComponentType,
    pub description: &'static str,
    pub data_requirements: &'static str,
    pub default_grid: (u64, u64),
}

/// The catalog the orchestrator describes to the model. Kinds missing here
/// are still accepted in layouts; they just are not advertised.
pub fn component_registry() -> Vec<RegisteredComponent> {
    vec![
        RegisteredComponent {
            kind: ComponentType::MetricCard,
            description: "Summarizes a single metric value, often with a trend indicator. Best for high-level KPIs.",
            data_requirements: "Single object with { value: number, trend: number, suffix: string }",
            default_grid: (3, 2),
        },
        RegisteredComponent {
            kind: ComponentType::LineChart,
            description: "Displays trends over time. Best for continuous data series showing change.",
            data_requirements: "Array of objects with { name: string, value: number }",
            default_grid: (6, 4),
        },
        RegisteredComponent {
            kind: ComponentType::BarChart,
            description: "Presents categorical comparisons. Best for ranking or distribution across groups.",
            data_requirements: "Array of objects with { name: string, value: number }",
            default_grid: (6, 4),
        },
        RegisteredComponent {
            kind: ComponentType::PieChart,
            description: "Shows part-to-whole relationships. Best for simple compositions (max 8 slices).",
            data_requirements: "Array of objects with { name: string, value: number }",
            default_grid: (4, 4),
        },
        RegisteredComponent {
            kind: ComponentType::AreaChart,
            description: "Shows cumulative totals over time. Best for volume trends and stacked comparisons.",
            data_requirements: "Array of objects with { name: string, value: number }",
            default_grid: (8, 4),
        },
        RegisteredComponent {
            kind: ComponentType::DataTable,
            description: "Displays granular raw data. Best for detailed exploration and export.",
            data_requirements: "Array of flat objects.",
            default_grid: (12, 6),
        },
        RegisteredComponent {
            kind: ComponentType::InsightCard,
            description: "AI-generated narrative. Best for summarizing complex findings.",
            data_requirements: "Props with { summary: string, impact: string }",
            default_grid: (12, 4),
        },
        RegisteredComponent {
            kind: ComponentType::LineageGraph,
            description: "Data provenance and flow visualization. Best for tracking data origins.",
            data_requirements: "Object with { nodes: [], edges: [] }",
            default_grid: (8, 5),
        },
        RegisteredComponent {
            kind: ComponentType::PredictiveMonitor,
            description: "Real-time trajectory tracking and anomaly forecasting.",
            data_requirements: "Object with { history: [], forecast: [] }",
            default_grid: (8, 5),
        },
        RegisteredComponent {
            kind: ComponentType::SimulationPanel,
            description: "Scenario modeling and what-if analysis controls.",
            data_requirements: "Array of simulation variables",
            default_grid: (4, 4),
        },
    ]
}

/// One line per component kind, for embedding into the model request.
pub fn registry_summary() -> String {
    component_registry()
        .iter()
        .map(|c| {
            format!(
                "- {} (default {}x{}): {} Data: {}",
                c.kind.as_str(),
                c.default_grid.0,
                c.default_grid.1,
                c.description,
                c.data_requirements
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_summary_lists_kinds() {
        let summary = registry_summary();
        assert!(summary.contains("- MetricCard (default 3x2):"));
        assert!(summary.contains("- LineageGraph"));
    }
}
