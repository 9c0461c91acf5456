//! Wire types for the Ollama generation API
//!
//! Every streamed endpoint answers with newline-delimited JSON records. The
//! structs here describe one record each; the client crate decides how a
//! sequence of them is consumed.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ============================================================================
// Generation
// ============================================================================

/// Body of `POST /api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Conversation context returned by the previous completed generation
    pub context: Vec<i64>,
    pub stream: bool,
}

/// One streamed record of a generation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRecord {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub context: Option<Vec<i64>>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

// ============================================================================
// Model management
// ============================================================================

/// Body shared by show, pull and delete requests
#[derive(Debug, Clone, Serialize)]
pub struct NameRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl NameRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stream: None,
        }
    }

    pub fn streaming(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stream: Some(true),
        }
    }
}

/// Response of `GET /api/tags`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

/// An installed model as listed by `GET /api/tags`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    /// Size on disk in bytes
    #[serde(default)]
    pub size: u64,
    pub modified_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub digest: String,
}

/// Long-form model information from `POST /api/show`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub modelfile: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub parameters: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
}

impl ModelDetails {
    /// Present fields in display order, labelled
    pub fn sections(&self) -> Vec<(&'static str, &str)> {
        [
            ("modelfile", self.modelfile.as_deref()),
            ("license", self.license.as_deref()),
            ("parameters", self.parameters.as_deref()),
            ("template", self.template.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

/// One progress record of `POST /api/pull`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PullStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
}

impl PullStatus {
    /// Byte counts, when the record carries a usable total
    pub fn byte_counts(&self) -> Option<(u64, u64)> {
        match self.total {
            Some(total) if total > 0 => Some((self.completed.unwrap_or(0), total)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_record_defaults() {
        let record: GenerateRecord = serde_json::from_str(r#"{"model":"llama2"}"#).unwrap();
        assert_eq!(record.response, "");
        assert!(!record.done);
        assert!(record.context.is_none());
    }

    #[test]
    fn test_generate_record_done_with_context() {
        let record: GenerateRecord =
            serde_json::from_str(r#"{"response":"","done":true,"context":[1,2,3]}"#).unwrap();
        assert!(record.done);
        assert_eq!(record.context, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_tags_response() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"llama3:latest","size":4661224676,
                "modified_at":"2024-05-01T12:34:56.123456789+02:00","digest":"abc"}]}"#,
        )
        .unwrap();
        assert_eq!(tags.models.len(), 1);
        assert_eq!(tags.models[0].name, "llama3:latest");
        assert_eq!(tags.models[0].size, 4_661_224_676);
    }

    #[test]
    fn test_model_details_sections_skip_missing() {
        let details = ModelDetails {
            license: Some("MIT".to_string()),
            template: Some("{{ .Prompt }}".to_string()),
            ..Default::default()
        };
        let labels: Vec<&str> = details.sections().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["license", "template"]);
    }

    #[test]
    fn test_pull_status_byte_counts() {
        let status: PullStatus =
            serde_json::from_str(r#"{"status":"pulling","total":100,"completed":10}"#).unwrap();
        assert_eq!(status.byte_counts(), Some((10, 100)));

        let status: PullStatus = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert_eq!(status.byte_counts(), None);
    }

    #[test]
    fn test_name_request_omits_stream_flag() {
        let body = serde_json::to_value(NameRequest::new("llama3")).unwrap();
        assert_eq!(body, serde_json::json!({"name": "llama3"}));
        let body = serde_json::to_value(NameRequest::streaming("llama3")).unwrap();
        assert_eq!(body, serde_json::json!({"name": "llama3", "stream": true}));
    }
}
