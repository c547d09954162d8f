// Detected data source domain model and schema inference
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One flat record of a tabular source.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Csv,
    Json,
    Excel,
    Image,
    GoogleSheets,
    Airtable,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaHints {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schema: BTreeMap<String, FieldType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_layout: Option<String>,
}

/// Typed, schema-annotated summary of an input artifact. Immutable once
/// produced; owned by the session for the duration of one analysis thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<SchemaHints>,
}

impl DetectedSource {
    pub fn unknown(label: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Unknown,
            label: label.into(),
            rows: None,
            hints: None,
        }
    }
}

/// True when the value reads as a finite float: real numbers and numeric
/// strings count, everything else (bools, nulls, nested values) does not.
pub fn is_numeric(value: &Value) -> bool {
    numeric_value(value).is_some()
}

pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Infer metric/dimension roles from the first record only. If the first row
/// is atypical a field can be misclassified; downstream binding tolerates
/// that rather than re-scanning the data.
pub fn infer_schema(rows: &[Row]) -> Option<SchemaHints> {
    let first = rows.first()?;
    let mut hints = SchemaHints {
        suggested_layout: Some("Auto-detected Dataset".to_string()),
        ..SchemaHints::default()
    };

    for (key, value) in first {
        if is_numeric(value) {
            hints.metrics.push(key.clone());
            hints.schema.insert(key.clone(), FieldType::Number);
        } else {
            hints.dimensions.push(key.clone());
            hints.schema.insert(key.clone(), FieldType::String);
        }
    }

    Some(hints)
}
