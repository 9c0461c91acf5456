use async_trait::async_trait;
use futures::stream::BoxStream;

use ollama_kernel_models::{ModelDescriptor, ModelDetails, PullStatus};

use crate::error::ServiceError;

pub mod ndjson;
pub mod ollama;

pub use ollama::OllamaClient;

/// One event of a generation stream
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateEvent {
    /// Next piece of generated text, possibly empty
    Fragment(String),
    /// Final record; carries the conversation context for the next call when the server sent one
    Done { context: Option<Vec<i64>> },
}

/// Raw generation events; errors terminate the stream
pub type EventStream = BoxStream<'static, Result<GenerateEvent, ServiceError>>;

/// Generated text fragments in emission order
pub type FragmentStream<'a> = BoxStream<'a, Result<String, ServiceError>>;

/// Records of a non-generation endpoint
pub type RecordStream<T> = BoxStream<'static, Result<T, ServiceError>>;

/// Model service trait - the seam between the session and the HTTP API
///
/// Every stream is lazy: nothing is sent until it is first polled, and a
/// stream that has ended (or failed) cannot be restarted.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Base URL requests are sent to
    fn base_url(&self) -> &str;

    /// Model used for generation
    fn model(&self) -> &str;

    /// Point the client at a new server/model without dropping its conversation context
    fn reconfigure(&mut self, base_url: &str, model: &str);

    /// Conversation context of the last completed generation
    fn context(&self) -> &[i64];

    /// Stream the response to `prompt`
    ///
    /// Leading whitespace is stripped from the first non-empty fragment. The
    /// conversation context is replaced when the final record arrives.
    fn generate(&mut self, prompt: &str) -> FragmentStream<'_>;

    /// Installed models
    fn list_models(&self) -> RecordStream<ModelDescriptor>;

    /// Long-form information about one model
    fn describe_model(&self, name: &str) -> RecordStream<ModelDetails>;

    /// Download a model, reporting progress records
    fn pull_model(&self, name: &str) -> RecordStream<PullStatus>;

    /// Remove an installed model
    async fn delete_model(&self, name: &str) -> Result<(), ServiceError>;
}
