// Gateway trait for the external generative model
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Marker strings that identify a rate-limit-class failure in provider
/// error messages, alongside the 429 status code itself.
const RATE_LIMIT_MARKERS: [&str; 2] = ["429", "RESOURCE_EXHAUSTED"];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model rate limited: {0}")]
    RateLimited(String),
    #[error("model request failed: {0}")]
    Network(String),
    #[error("model response malformed: {0}")]
    Malformed(String),
}

impl ModelError {
    /// Only rate-limited errors are retryable.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ModelError::RateLimited(_))
    }

    /// Classify a provider failure: 429 status or a recognized marker in the
    /// message means rate-limited, everything else is a generic failure.
    pub fn from_provider(status: Option<u16>, message: String) -> Self {
        if status == Some(429) || RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m)) {
            ModelError::RateLimited(message)
        } else {
            ModelError::Network(message)
        }
    }
}

/// What the vision model extracts from an uploaded chart/table image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageAnalysis {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    #[serde(default)]
    pub dimensions: Option<Vec<String>>,
}

/// Fully composed layout-generation request.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub prompt: String,
    pub temperature: f32,
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Ask the model for a layout. Returns the raw textual reply; healing and
    /// validation happen upstream.
    async fn generate_layout(&self, request: &LayoutRequest) -> Result<String, ModelError>;

    /// Ask the vision model to describe a chart/table image.
    async fn analyze_image(&self, bytes: &[u8], mime: &str) -> Result<ImageAnalysis, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_429_status() {
        let err = ModelError::from_provider(Some(429), "quota exceeded".to_string());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_classify_marker_in_message() {
        let err = ModelError::from_provider(None, "error: RESOURCE_EXHAUSTED".to_string());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_classify_other_errors() {
        let err = ModelError::from_provider(Some(500), "internal error".to_string());
        assert!(!err.is_rate_limited());

        let err = ModelError::from_provider(None, "connection refused".to_string());
        assert!(!err.is_rate_limited());
    }
}
