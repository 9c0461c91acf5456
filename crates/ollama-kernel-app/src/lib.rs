//! ollama-kernel
//!
//! Notebook front-end for a local Ollama server: cell text goes through the
//! `%%` command dispatcher, the remaining prompt is streamed to the model and
//! the response is rendered into an output sink.

// Re-export workspace crates
pub use ollama_kernel_api::{self as api, ModelService, OllamaClient, ServiceError};
pub use ollama_kernel_logging as logging;
pub use ollama_kernel_models as models;

// Local modules
pub mod app;
pub mod cli;
pub mod config;
pub mod magics;
pub mod render;
pub mod session;
pub mod sink;

// Re-exports from local modules
pub use cli::Cli;
pub use config::{ConfigError, ConfigOverrides, ConfigSource, KernelConfig};
pub use magics::dispatch;
pub use render::{LineWrapper, MarkdownBlock, Renderer};
pub use session::{ClientFactory, ExecuteReply, Session, SessionState, GENERIC_HINT};
pub use sink::{CapturedOutput, DisplayData, DisplayId, OutputEvent, OutputSink, StreamName, TerminalSink};
