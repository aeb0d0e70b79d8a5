use serde::{Deserialize, Serialize};

/// Analytics output is produced by the backend's analysis jobs and has no fixed schema.
pub type AnalyticsResults = serde_json::Value;

/// Body of `POST /api/v1/analytics/run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub analysis_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl SystemHealth {
    pub fn new(status: &str, message: &str) -> Self {
        Self {
            status: status.to_string(),
            message: Some(message.to_string()),
            details: serde_json::Map::new(),
        }
    }
}
