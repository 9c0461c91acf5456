use async_stream::try_stream;
use async_trait::async_trait;
use futures::{pin_mut, StreamExt};

use ollama_kernel_logging::{log_request, log_response};
use ollama_kernel_models::{
    GenerateRecord, GenerateRequest, ModelDescriptor, ModelDetails, NameRequest, PullStatus,
    TagsResponse,
};

use crate::client::ndjson::records;
use crate::client::{EventStream, FragmentStream, GenerateEvent, ModelService, RecordStream};
use crate::error::ServiceError;

/// Ollama HTTP client
///
/// Holds the conversation context of the dialogue so far; reconfiguring host
/// or model keeps it.
pub struct OllamaClient {
    base_url: String,
    model: String,
    context: Vec<i64>,
    verbose: bool,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        // Ensure base_url doesn't end with a slash
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            model: model.into(),
            context: Vec::new(),
            verbose: false,
            client: reqwest::Client::new(),
        }
    }

    /// Log requests and streamed records to stderr
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw generation events for `prompt`, continuing from the stored context
    ///
    /// The stream owns everything it needs, so the caller decides what to do
    /// with the final context.
    pub fn generate_events(&self, prompt: &str) -> EventStream {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            context: self.context.clone(),
            stream: true,
        };
        let url = self.endpoint("/api/generate");
        let client = self.client.clone();
        let verbose = self.verbose;

        Box::pin(try_stream! {
            log_request("POST", &url, Some(&request), verbose);
            let response = send_checked(client.post(&url).json(&request), verbose).await?;

            let records = records::<GenerateRecord>(response, verbose);
            pin_mut!(records);

            let mut finished = false;
            while let Some(record) = records.next().await {
                let record = record?;
                if !record.response.is_empty() || !record.done {
                    yield GenerateEvent::Fragment(record.response);
                }
                if record.done {
                    finished = true;
                    yield GenerateEvent::Done { context: record.context };
                    break;
                }
            }

            if !finished {
                Err::<(), _>(ServiceError::truncated("generate"))?;
            }
        })
    }

    fn name_request_stream<T>(&self, method: reqwest::Method, path: &str, body: NameRequest) -> RecordStream<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let url = self.endpoint(path);
        let client = self.client.clone();
        let verbose = self.verbose;

        Box::pin(try_stream! {
            log_request(method.as_str(), &url, Some(&body), verbose);
            let response = send_checked(client.request(method, &url).json(&body), verbose).await?;

            let records = records::<T>(response, verbose);
            pin_mut!(records);
            while let Some(record) = records.next().await {
                yield record?;
            }
        })
    }
}

#[async_trait]
impl ModelService for OllamaClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn reconfigure(&mut self, base_url: &str, model: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.model = model.to_string();
    }

    fn context(&self) -> &[i64] {
        &self.context
    }

    fn generate(&mut self, prompt: &str) -> FragmentStream<'_> {
        let events = self.generate_events(prompt);

        Box::pin(try_stream! {
            let mut events = events;
            let mut first = true;
            while let Some(event) = events.next().await {
                match event? {
                    GenerateEvent::Fragment(text) => {
                        if first && !text.is_empty() {
                            first = false;
                            yield text.trim_start().to_string();
                        } else {
                            yield text;
                        }
                    }
                    GenerateEvent::Done { context } => {
                        if let Some(context) = context {
                            self.context = context;
                        }
                    }
                }
            }
        })
    }

    fn list_models(&self) -> RecordStream<ModelDescriptor> {
        let url = self.endpoint("/api/tags");
        let client = self.client.clone();
        let verbose = self.verbose;

        Box::pin(try_stream! {
            log_request::<()>("GET", &url, None, verbose);
            let response = send_checked(client.get(&url), verbose).await?;

            let records = records::<TagsResponse>(response, verbose);
            pin_mut!(records);
            while let Some(tags) = records.next().await {
                for model in tags?.models {
                    yield model;
                }
            }
        })
    }

    fn describe_model(&self, name: &str) -> RecordStream<ModelDetails> {
        self.name_request_stream(reqwest::Method::POST, "/api/show", NameRequest::new(name))
    }

    fn pull_model(&self, name: &str) -> RecordStream<PullStatus> {
        self.name_request_stream(reqwest::Method::POST, "/api/pull", NameRequest::streaming(name))
    }

    async fn delete_model(&self, name: &str) -> Result<(), ServiceError> {
        let url = self.endpoint("/api/delete");
        let body = NameRequest::new(name);

        log_request("DELETE", &url, Some(&body), self.verbose);
        send_checked(self.client.delete(&url).json(&body), self.verbose).await?;
        Ok(())
    }
}

/// Send a request, turning any non-2xx status into an error carrying the server's message
async fn send_checked(
    request: reqwest::RequestBuilder,
    verbose: bool,
) -> Result<reqwest::Response, ServiceError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log_response(&status, &body, verbose);
        return Err(ServiceError::HttpStatus {
            status: status.as_u16(),
            message: error_message(&body, status),
        });
    }

    Ok(response)
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        trimmed.to_string()
    }
}
