//! # ollama-kernel-api
//!
//! Client for a locally running Ollama model service.
//!
//! ## Features
//!
//! - **Lazy streams**: every streamed endpoint is exposed as a `Stream`; the HTTP
//!   request is only sent when the stream is first polled
//! - **Conversation context**: `generate` round-trips the context token sequence
//!   returned by the server so consecutive prompts continue one dialogue
//! - **Error taxonomy**: transport, protocol and service-reported failures are
//!   distinguished by [`ServiceError::kind`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use ollama_kernel_api::{ModelService, OllamaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ollama_kernel_api::ServiceError> {
//!     let mut client = OllamaClient::new("http://localhost:11434", "llama2");
//!
//!     let mut fragments = client.generate("Why is the sky blue?");
//!     while let Some(fragment) = fragments.next().await {
//!         print!("{}", fragment?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use client::{
    ModelService,
    OllamaClient,
    GenerateEvent,
    EventStream,
    FragmentStream,
    RecordStream,
};

pub use config::{
    DEFAULT_HOST,
    DEFAULT_PORT,
    DEFAULT_MODEL,
    base_url,
    parse_host_spec,
    validate_base_url,
};

pub use error::{ErrorKind, ServiceError};

pub use ollama_kernel_models::{ModelDescriptor, ModelDetails, PullStatus};
