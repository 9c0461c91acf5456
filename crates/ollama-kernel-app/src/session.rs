//! Session state and the execution controller

use anyhow::Result;
use colored::Colorize;
use futures::StreamExt;

use ollama_kernel_api::{base_url, ModelService, OllamaClient, ServiceError, DEFAULT_HOST, DEFAULT_PORT};
use ollama_kernel_logging::{get_logs_dir, TranscriptLogger};

use crate::config::{ConfigError, ConfigOverrides, ConfigSource, KernelConfig};
use crate::magics::dispatch;
use crate::render::Renderer;
use crate::sink::OutputSink;

/// Remediation hint printed after every error diagnostic
pub const GENERIC_HINT: &str = "Something went wrong. Have you set host address and model correctly?";

/// Builds the model service client from the session configuration and base URL
pub type ClientFactory = Box<dyn Fn(&KernelConfig, &str) -> Box<dyn ModelService> + Send + Sync>;

/// Factory producing real Ollama clients
pub fn ollama_factory() -> ClientFactory {
    Box::new(|config: &KernelConfig, base_url: &str| -> Box<dyn ModelService> {
        Box::new(OllamaClient::new(base_url, config.model.as_str()).with_verbose(config.verbose))
    })
}

// ============================================================================
// Session state
// ============================================================================

/// Mutable state shared by the dispatcher and the controller
///
/// The client is created lazily on first use and kept for the rest of the
/// session; configuration changes only mark it stale so the next use points
/// it at the new host and model without losing its conversation context.
pub struct SessionState {
    config: KernelConfig,
    base_url: String,
    client: Option<Box<dyn ModelService>>,
    client_stale: bool,
    factory: ClientFactory,
}

impl SessionState {
    pub fn new(factory: ClientFactory) -> Self {
        let config = KernelConfig::default();
        Self {
            base_url: base_url(DEFAULT_HOST, DEFAULT_PORT),
            config,
            client: None,
            client_stale: false,
            factory,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_client_stale(&self) -> bool {
        self.client_stale
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Replace the whole configuration after validating it
    pub fn apply_config(&mut self, config: KernelConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.base_url = config.base_url()?;
        self.config = config;
        self.mark_stale();
        Ok(())
    }

    /// Set the host, and the port when given; returns the new base URL
    pub fn set_host(&mut self, host: &str, port: Option<u16>) -> Result<&str, ConfigError> {
        if host.is_empty() {
            return Err(ConfigError::InvalidHost(host.to_string()));
        }
        let mut candidate = self.config.clone();
        candidate.host = host.to_string();
        if let Some(port) = port {
            candidate.port = port;
        }

        self.base_url = candidate.base_url()?;
        self.config = candidate;
        self.mark_stale();
        Ok(&self.base_url)
    }

    pub fn set_port(&mut self, port: u16) -> Result<&str, ConfigError> {
        let host = self.config.host.clone();
        self.set_host(&host, Some(port))
    }

    pub fn set_model(&mut self, model: &str) {
        self.config.model = model.to_string();
        self.mark_stale();
    }

    pub fn set_width(&mut self, width: usize) {
        self.config.width = width.max(1);
        self.mark_stale();
    }

    pub fn set_markdown(&mut self, markdown: bool) {
        self.config.markdown = markdown;
        self.mark_stale();
    }

    fn mark_stale(&mut self) {
        self.client_stale = true;
    }

    /// Create the client if needed and apply pending configuration changes
    pub fn ensure_client(&mut self) {
        let stale = std::mem::replace(&mut self.client_stale, false);
        match &mut self.client {
            None => {
                self.client = Some((self.factory)(&self.config, &self.base_url));
            }
            Some(client) if stale => client.reconfigure(&self.base_url, &self.config.model),
            Some(_) => {}
        }
    }

    /// The up-to-date client
    pub fn client(&mut self) -> &mut dyn ModelService {
        self.ensure_client();
        let config = &self.config;
        let base_url = &self.base_url;
        let factory = &self.factory;
        self.client
            .get_or_insert_with(|| factory(config, base_url))
            .as_mut()
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Configuration lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unconfigured,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Ok,
}

/// Reply to one execution request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteReply {
    pub status: ExecutionStatus,
    pub execution_count: u32,
}

/// Drives one interactive session: one cell at a time, to completion
pub struct Session {
    state: SessionState,
    phase: Phase,
    source: ConfigSource,
    overrides: ConfigOverrides,
    execution_count: u32,
    transcript: Option<TranscriptLogger>,
}

impl Session {
    pub fn new(source: ConfigSource, overrides: ConfigOverrides) -> Self {
        Self::with_factory(source, overrides, ollama_factory())
    }

    pub fn with_factory(source: ConfigSource, overrides: ConfigOverrides, factory: ClientFactory) -> Self {
        Self {
            state: SessionState::new(factory),
            phase: Phase::Unconfigured,
            source,
            overrides,
            execution_count: 0,
            transcript: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    /// Execute one cell
    ///
    /// Errors are reported to the sink's error stream; the reply is always ok.
    pub async fn execute(&mut self, code: &str, sink: &mut dyn OutputSink) -> ExecuteReply {
        self.execution_count += 1;
        self.ensure_configured(sink).await;

        let prompt = dispatch(&mut self.state, code, sink).await;
        self.state.ensure_client();

        if !prompt.trim().is_empty() {
            self.generate(&prompt, sink).await;
        }

        ExecuteReply {
            status: ExecutionStatus::Ok,
            execution_count: self.execution_count,
        }
    }

    /// Flush the transcript, if one is open
    pub async fn shutdown(&mut self) {
        if let Some(transcript) = &mut self.transcript {
            transcript.shutdown().await;
        }
    }

    async fn ensure_configured(&mut self, sink: &mut dyn OutputSink) {
        if self.phase == Phase::Ready {
            return;
        }
        self.phase = Phase::Ready;

        match self.source.resolve(&self.overrides) {
            Ok(loaded) => {
                if loaded.config.verbose {
                    let origin = loaded
                        .path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "built-in defaults".to_string());
                    eprintln!("{}", format!("🔧 Configuration loaded from {}", origin).bright_black());
                }
                if let Err(err) = self.state.apply_config(loaded.config) {
                    report_config_error(sink, &err);
                }
            }
            Err(err) => {
                sink.stderr(&format!("ConfigError: {:#}\n{}\n", err, GENERIC_HINT));
                let fallback = self.source.fallback(&self.overrides);
                if let Err(err) = self.state.apply_config(fallback) {
                    report_config_error(sink, &err);
                }
            }
        }

        if self.state.config().transcript {
            match open_transcript().await {
                Ok(logger) => {
                    if self.state.config().verbose {
                        eprintln!("{}", format!("📝 Transcript: {}", logger.path().display()).bright_black());
                    }
                    self.transcript = Some(logger);
                }
                Err(err) => sink.stderr(&format!("Transcript logging disabled: {:#}\n", err)),
            }
        }
    }

    async fn generate(&mut self, prompt: &str, sink: &mut dyn OutputSink) {
        let mut renderer = Renderer::for_config(self.state.config());
        let mut response = String::new();

        let result = stream_response(self.state.client(), prompt, &mut renderer, &mut response, sink).await;
        if let Err(err) = &result {
            report_service_error(sink, err);
        }

        if let Some(transcript) = &mut self.transcript {
            let error = result.as_ref().err().map(|err| format!("{}: {}", err.kind(), err));
            transcript
                .log_exchange(&self.state.config().model, prompt, &response, error.as_deref())
                .await;
        }
    }
}

async fn stream_response(
    client: &mut dyn ModelService,
    prompt: &str,
    renderer: &mut Renderer,
    response: &mut String,
    sink: &mut dyn OutputSink,
) -> Result<(), ServiceError> {
    let mut fragments = client.generate(prompt);
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        response.push_str(&fragment);
        renderer.render(&fragment, sink);
    }
    Ok(())
}

async fn open_transcript() -> Result<TranscriptLogger> {
    let logs_dir = get_logs_dir()?;
    TranscriptLogger::new(&logs_dir).await
}

/// Diagnostic for a failed service call, followed by the generic hint
pub fn report_service_error(sink: &mut dyn OutputSink, err: &ServiceError) {
    sink.stderr(&format!("{}: {}\n{}\n", err.kind(), err, GENERIC_HINT));
}

pub fn report_config_error(sink: &mut dyn OutputSink, err: &ConfigError) {
    sink.stderr(&format!("ConfigError: {}\n{}\n", err, GENERIC_HINT));
}
