//! Rendering of generated fragments into an output sink

pub mod markdown;
pub mod wrap;

pub use markdown::{render_markdown_html, MarkdownBlock};
pub use wrap::LineWrapper;

use crate::config::KernelConfig;
use crate::sink::OutputSink;

/// Active output mode for one response
#[derive(Debug)]
pub enum Renderer {
    /// Plain text wrapped at a fixed width, redrawn with carriage returns
    Wrapped(LineWrapper),
    /// One live markdown block updated after every fragment
    Markdown(MarkdownBlock),
}

impl Renderer {
    pub fn for_config(config: &KernelConfig) -> Self {
        if config.markdown {
            Renderer::Markdown(MarkdownBlock::new())
        } else {
            Renderer::Wrapped(LineWrapper::new(config.width))
        }
    }

    pub fn render(&mut self, fragment: &str, sink: &mut dyn OutputSink) {
        match self {
            Renderer::Wrapped(wrapper) => {
                for chunk in wrapper.push(fragment) {
                    sink.stdout(&chunk);
                }
            }
            Renderer::Markdown(block) => block.push(fragment, sink),
        }
    }
}
