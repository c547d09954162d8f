// Gemini REST gateway implementation of the model gateway trait
use crate::application::model_gateway::{ImageAnalysis, LayoutRequest, ModelError, ModelGateway};
use crate::infrastructure::config::{CredentialProvider, ModelSettings};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const IMAGE_ANALYSIS_PROMPT: &str = "Analyze this chart or table image. Extract primary metrics \
and dimensions. Return JSON with 'label', 'metrics', 'dimensions'.";

pub struct GeminiGateway {
    host: String,
    architect_model: String,
    vision_model: String,
    credentials: CredentialProvider,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiGateway {
    pub fn new(settings: ModelSettings, credentials: CredentialProvider) -> Self {
        Self {
            host: settings.host.trim_end_matches('/').to_string(),
            architect_model: settings.architect_model,
            vision_model: settings.vision_model,
            credentials,
        }
    }

    /// A fresh client per call: the credential provider is consulted each
    /// time so a rotated key takes effect on the very next request.
    fn fresh_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    async fn generate_content(&self, model: &str, body: Value) -> Result<String, ModelError> {
        let key = (self.credentials)()
            .ok_or_else(|| ModelError::Network("no model credential configured".to_string()))?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.host, model);

        let response = self
            .fresh_client()
            .post(&url)
            .header("x-goog-api-key", key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::from_provider(None, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::from_provider(
                Some(status.as_u16()),
                format!("model API error {}: {}", status, body),
            ));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Malformed(format!("response parse failed: {}", e)))?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ModelError::Malformed("empty model reply".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate_layout(&self, request: &LayoutRequest) -> Result<String, ModelError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": request.temperature,
                "responseSchema": layout_response_schema()
            }
        });
        self.generate_content(&self.architect_model, body).await
    }

    async fn analyze_image(&self, bytes: &[u8], mime: &str) -> Result<ImageAnalysis, ModelError> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": IMAGE_ANALYSIS_PROMPT },
                    { "inlineData": { "mimeType": mime, "data": BASE64.encode(bytes) } }
                ]
            }],
            "generationConfig": { "responseMimeType": "application/json" }
        });
        let text = self.generate_content(&self.vision_model, body).await?;
        serde_json::from_str(&text)
            .map_err(|e| ModelError::Malformed(format!("image analysis parse failed: {}", e)))
    }
}

/// Response schema constraint sent with every layout request: the model is
/// held to `{id, name, insights[], components[]}` with full audit fields on
/// each insight.
fn layout_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "name": { "type": "STRING" },
            "insights": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "type": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "summary": { "type": "STRING" },
                        "impact": { "type": "STRING" },
                        "confidence": { "type": "NUMBER" },
                        "reasoning": { "type": "STRING" },
                        "method": { "type": "STRING" }
                    },
                    "required": ["id", "type", "title", "summary", "impact", "confidence", "reasoning", "method"]
                }
            },
            "components": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "type": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "gridConfig": {
                            "type": "OBJECT",
                            "properties": {
                                "x": { "type": "NUMBER" },
                                "y": { "type": "NUMBER" },
                                "w": { "type": "NUMBER" },
                                "h": { "type": "NUMBER" }
                            },
                            "required": ["x", "y", "w", "h"]
                        },
                        "props": {
                            "type": "OBJECT",
                            "properties": {
                                "unit": { "type": "STRING" },
                                "isStacked": { "type": "BOOLEAN" },
                                "isDonut": { "type": "BOOLEAN" },
                                "showLegend": { "type": "BOOLEAN" },
                                "requiredFields": { "type": "ARRAY", "items": { "type": "STRING" } }
                            },
                            "required": ["requiredFields"]
                        }
                    },
                    "required": ["id", "type", "title", "gridConfig"]
                }
            }
        },
        "required": ["id", "name", "components"]
    })
}
