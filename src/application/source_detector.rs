// Source-sniffing chain: classify an input artifact and infer its schema
use crate::application::model_gateway::ModelGateway;
use crate::domain::source::{DetectedSource, Row, SchemaHints, SourceKind, infer_schema};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Input to detection: either a plain string (query or URL) or an uploaded
/// artifact with its filename and bytes.
pub enum ArtifactInput<'a> {
    Text(&'a str),
    File { name: &'a str, bytes: &'a [u8] },
}

#[derive(Clone)]
pub struct SourceDetector {
    gateway: Arc<dyn ModelGateway>,
}

impl SourceDetector {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Classify the input into a typed, schema-annotated source descriptor.
    /// Never fails: parser and vision-model errors degrade to an `unknown`
    /// kind or an image with its original filename as the label.
    pub async fn detect(&self, input: ArtifactInput<'_>) -> DetectedSource {
        match input {
            ArtifactInput::File { name, bytes } => {
                let extension = name
                    .rsplit('.')
                    .next()
                    .map(|ext| ext.to_ascii_lowercase())
                    .unwrap_or_default();

                if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
                    return self.analyze_image(name, bytes, &extension).await;
                }
                match extension.as_str() {
                    "csv" => parse_csv(name, bytes),
                    "json" => parse_json(name, bytes),
                    "xlsx" | "xls" => parse_excel(name, bytes),
                    _ => DetectedSource::unknown(name),
                }
            }
            ArtifactInput::Text(text) => {
                if text.contains("docs.google.com/spreadsheets") {
                    return DetectedSource {
                        kind: SourceKind::GoogleSheets,
                        label: "Google Sheets".to_string(),
                        rows: None,
                        hints: None,
                    };
                }
                if text.contains("airtable.com") {
                    return DetectedSource {
                        kind: SourceKind::Airtable,
                        label: "Airtable".to_string(),
                        rows: None,
                        hints: None,
                    };
                }
                DetectedSource::unknown("Natural Language Query")
            }
        }
    }

    async fn analyze_image(&self, name: &str, bytes: &[u8], extension: &str) -> DetectedSource {
        let mime = match extension {
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            _ => "image/png",
        };

        match self.gateway.analyze_image(bytes, mime).await {
            Ok(analysis) => DetectedSource {
                kind: SourceKind::Image,
                label: analysis.label.unwrap_or_else(|| name.to_string()),
                rows: None,
                hints: Some(SchemaHints {
                    metrics: analysis.metrics.unwrap_or_default(),
                    dimensions: analysis.dimensions.unwrap_or_default(),
                    ..SchemaHints::default()
                }),
            },
            Err(err) => {
                tracing::warn!("Image analysis failed for {}: {}", name, err);
                DetectedSource {
                    kind: SourceKind::Image,
                    label: name.to_string(),
                    rows: None,
                    hints: None,
                }
            }
        }
    }
}

fn tabular_source(kind: SourceKind, label: &str, rows: Vec<Row>) -> DetectedSource {
    let hints = infer_schema(&rows);
    DetectedSource {
        kind,
        label: label.to_string(),
        rows: Some(rows),
        hints,
    }
}

/// Parse CSV with dynamic typing: numeric cells become numbers, true/false
/// become booleans, everything else stays a string.
fn parse_csv(name: &str, bytes: &[u8]) -> DetectedSource {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            tracing::warn!("CSV header read failed for {}: {}", name, err);
            return DetectedSource::unknown(name);
        }
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                let mut row = Row::new();
                for (header, field) in headers.iter().zip(record.iter()) {
                    row.insert(header.to_string(), dynamic_value(field));
                }
                rows.push(row);
            }
            Err(err) => {
                tracing::warn!("Skipping malformed CSV record in {}: {}", name, err);
            }
        }
    }

    tabular_source(SourceKind::Csv, name, rows)
}

fn dynamic_value(field: &str) -> Value {
    if let Ok(n) = field.trim().parse::<f64>() {
        if n.is_finite() {
            if let Some(number) = serde_json::Number::from_f64(n) {
                return Value::Number(number);
            }
        }
    }
    match field {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(field.to_string()),
    }
}

/// A single JSON object is normalized to a one-element array before
/// inference; non-object array elements are dropped.
fn parse_json(name: &str, bytes: &[u8]) -> DetectedSource {
    let parsed: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("JSON parse failed for {}: {}", name, err);
            return DetectedSource::unknown(name);
        }
    };

    let rows: Vec<Row> = match parsed {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
        Value::Object(row) => vec![row],
        _ => Vec::new(),
    };

    tabular_source(SourceKind::Json, name, rows)
}

/// First worksheet only; the first row supplies headers and empty cells are
/// left out of their record.
fn parse_excel(name: &str, bytes: &[u8]) -> DetectedSource {
    use calamine::{Data, Reader};

    let mut workbook = match calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())) {
        Ok(workbook) => workbook,
        Err(err) => {
            tracing::warn!("Workbook open failed for {}: {}", name, err);
            return DetectedSource::unknown(name);
        }
    };

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        _ => {
            tracing::warn!("No readable worksheet in {}", name);
            return DetectedSource::unknown(name);
        }
    };

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return tabular_source(SourceKind::Excel, name, Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();

    let mut rows = Vec::new();
    for sheet_row in iter {
        let mut row = Row::new();
        for (header, cell) in headers.iter().zip(sheet_row.iter()) {
            let value = match cell {
                Data::Empty => continue,
                Data::Float(f) => serde_json::Number::from_f64(*f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                Data::Int(i) => Value::Number((*i).into()),
                Data::Bool(b) => Value::Bool(*b),
                other => Value::String(other.to_string()),
            };
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }

    tabular_source(SourceKind::Excel, name, rows)
}
