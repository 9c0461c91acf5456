#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock Ollama server for exercising the client end to end
pub struct OllamaMockServer {
    server: MockServer,
}

impl OllamaMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// JSON bodies of every request received on `request_path`, in arrival order
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

    /// Streamed generation: one record per fragment, then a done record with `context`
    pub async fn mock_generate(&self, fragments: &[&str], context: &[i64]) {
        let mut records: Vec<Value> = fragments
            .iter()
            .map(|f| json!({"model": "llama2", "response": f, "done": false}))
            .collect();
        records.push(json!({"model": "llama2", "response": "", "done": true, "context": context}));

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ndjson(&records))
            .mount(&self.server)
            .await;
    }

    /// Generation answering with raw NDJSON lines
    pub async fn mock_generate_raw(&self, body: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-ndjson")
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_tags(&self, models: Value) {
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": models })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_show(&self, name: &str, details: Value) {
        Mock::given(method("POST"))
            .and(path("/api/show"))
            .and(body_partial_json(json!({ "name": name })))
            .respond_with(ResponseTemplate::new(200).set_body_json(details))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_pull(&self, records: &[Value]) {
        Mock::given(method("POST"))
            .and(path("/api/pull"))
            .respond_with(ndjson(records))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delete(&self, name: &str, status: u16) {
        let template = if status == 200 {
            ResponseTemplate::new(200)
        } else {
            ResponseTemplate::new(status).set_body_json(json!({
                "error": format!("model '{}' not found", name)
            }))
        };
        Mock::given(method("DELETE"))
            .and(path("/api/delete"))
            .and(body_partial_json(json!({ "name": name })))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Any request fails with a 500
    pub async fn mock_server_error(&self) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "Internal server error"
            })))
            .mount(&self.server)
            .await;
    }
}

fn ndjson(records: &[Value]) -> ResponseTemplate {
    let body: String = records.iter().map(|r| format!("{}\n", r)).collect();
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/x-ndjson")
        .set_body_string(body)
}
