#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

use ollama_kernel::{ConfigOverrides, ConfigSource, Session};

/// Mock Ollama server plus a session pointed at it
pub struct KernelHarness {
    pub server: MockServer,
}

impl KernelHarness {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn port(&self) -> u16 {
        self.server.address().port()
    }

    /// Session configured from defaults, talking to the mock server
    pub fn session(&self) -> Session {
        let overrides = ConfigOverrides {
            host: Some("127.0.0.1".to_string()),
            port: Some(self.port()),
            ..Default::default()
        };
        Session::new(ConfigSource::none(), overrides)
    }

    pub async fn request_bodies(&self, request_path: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }

    pub async fn mock_generate(&self, fragments: &[&str], context: &[i64]) {
        let mut records: Vec<Value> = fragments
            .iter()
            .map(|f| json!({"response": f, "done": false}))
            .collect();
        records.push(json!({"response": "", "done": true, "context": context}));
        self.mock_ndjson("POST", "/api/generate", &records).await;
    }

    pub async fn mock_ndjson(&self, http_method: &str, request_path: &str, records: &[Value]) {
        let body: String = records.iter().map(|r| format!("{}\n", r)).collect();
        Mock::given(method(http_method))
            .and(path(request_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-ndjson")
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delete(&self) {
        Mock::given(method("DELETE"))
            .and(path("/api/delete"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }
}
