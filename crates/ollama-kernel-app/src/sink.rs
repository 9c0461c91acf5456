//! Output sinks: where rendered text and live display blocks end up

use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;

use crate::render::render_markdown_html;

/// Named text stream of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamName {
    Stdout,
    Stderr,
}

impl StreamName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamName::Stdout => "stdout",
            StreamName::Stderr => "stderr",
        }
    }
}

/// Identifier of a live display block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayId(String);

impl DisplayId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DisplayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rich display payload, one representation per MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayData {
    /// `text/plain`
    pub plain: String,
    /// `text/markdown`
    pub markdown: Option<String>,
    /// `text/html`
    pub html: Option<String>,
}

impl DisplayData {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain: text.into(),
            markdown: None,
            html: None,
        }
    }

    /// Markdown source with its plain and HTML renditions
    pub fn markdown(source: &str) -> Self {
        Self {
            plain: source.to_string(),
            markdown: Some(source.to_string()),
            html: Some(render_markdown_html(source)),
        }
    }

    /// (mime type, content) pairs present in this payload
    pub fn mime_bundle(&self) -> Vec<(&'static str, &str)> {
        let mut bundle = vec![("text/plain", self.plain.as_str())];
        if let Some(markdown) = &self.markdown {
            bundle.push(("text/markdown", markdown.as_str()));
        }
        if let Some(html) = &self.html {
            bundle.push(("text/html", html.as_str()));
        }
        bundle
    }
}

/// Display surface receiving rendered output
pub trait OutputSink {
    /// Append text to a named stream
    fn stream(&mut self, name: StreamName, text: &str);

    /// Open a live display block
    fn display(&mut self, data: DisplayData) -> DisplayId;

    /// Replace the whole content of a live display block
    fn update_display(&mut self, id: &DisplayId, data: DisplayData);

    fn stdout(&mut self, text: &str) {
        self.stream(StreamName::Stdout, text);
    }

    fn stderr(&mut self, text: &str) {
        self.stream(StreamName::Stderr, text);
    }
}

/// Sink writing to the process's stdout and stderr
///
/// Live blocks are printed incrementally: an update that extends the text
/// already shown prints only the new tail.
#[derive(Debug, Default)]
pub struct TerminalSink {
    shown: HashMap<DisplayId, String>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_stdout(text: &str) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

impl OutputSink for TerminalSink {
    fn stream(&mut self, name: StreamName, text: &str) {
        match name {
            StreamName::Stdout => Self::write_stdout(text),
            StreamName::Stderr => {
                eprint!("{}", text.red());
                let _ = std::io::stderr().flush();
            }
        }
    }

    fn display(&mut self, data: DisplayData) -> DisplayId {
        let id = DisplayId::new();
        Self::write_stdout(&data.plain);
        self.shown.insert(id.clone(), data.plain);
        id
    }

    fn update_display(&mut self, id: &DisplayId, data: DisplayData) {
        let shown = self.shown.entry(id.clone()).or_default();
        match data.plain.strip_prefix(shown.as_str()) {
            Some(tail) => Self::write_stdout(tail),
            None => Self::write_stdout(&format!("\n{}", data.plain)),
        }
        *shown = data.plain;
    }
}

/// One recorded sink event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    Stream { name: StreamName, text: String },
    Display { id: DisplayId, data: DisplayData },
    Update { id: DisplayId, data: DisplayData },
}

/// Sink recording every event, for embedding hosts and tests
#[derive(Debug, Default)]
pub struct CapturedOutput {
    pub events: Vec<OutputEvent>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenated text written to one stream
    pub fn text(&self, stream: StreamName) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                OutputEvent::Stream { name, text } if *name == stream => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn stdout_text(&self) -> String {
        self.text(StreamName::Stdout)
    }

    pub fn stderr_text(&self) -> String {
        self.text(StreamName::Stderr)
    }

    /// Text chunks written to stdout, one entry per write
    pub fn stdout_chunks(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                OutputEvent::Stream { name: StreamName::Stdout, text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Latest payload of every display block, in opening order
    pub fn displays(&self) -> Vec<(DisplayId, DisplayData)> {
        let mut blocks: Vec<(DisplayId, DisplayData)> = Vec::new();
        for event in &self.events {
            match event {
                OutputEvent::Display { id, data } => blocks.push((id.clone(), data.clone())),
                OutputEvent::Update { id, data } => {
                    if let Some(block) = blocks.iter_mut().find(|(block_id, _)| block_id == id) {
                        block.1 = data.clone();
                    }
                }
                OutputEvent::Stream { .. } => {}
            }
        }
        blocks
    }
}

impl OutputSink for CapturedOutput {
    fn stream(&mut self, name: StreamName, text: &str) {
        self.events.push(OutputEvent::Stream {
            name,
            text: text.to_string(),
        });
    }

    fn display(&mut self, data: DisplayData) -> DisplayId {
        let id = DisplayId::new();
        self.events.push(OutputEvent::Display {
            id: id.clone(),
            data,
        });
        id
    }

    fn update_display(&mut self, id: &DisplayId, data: DisplayData) {
        self.events.push(OutputEvent::Update {
            id: id.clone(),
            data,
        });
    }
}
