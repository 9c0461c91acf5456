use pulldown_cmark::{html, Options, Parser};

use crate::sink::{DisplayData, DisplayId, OutputSink};

/// Render markdown to HTML
pub fn render_markdown_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// One growing markdown block per response
///
/// The first non-empty fragment opens a display; every later fragment
/// replaces its content with the whole text so far.
#[derive(Debug, Default)]
pub struct MarkdownBlock {
    text: String,
    display: Option<DisplayId>,
}

impl MarkdownBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn push(&mut self, fragment: &str, sink: &mut dyn OutputSink) {
        if fragment.is_empty() {
            return;
        }
        self.text.push_str(fragment);

        let data = DisplayData::markdown(&self.text);
        match &self.display {
            Some(id) => sink.update_display(id, data),
            None => self.display = Some(sink.display(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{CapturedOutput, OutputEvent};

    #[test]
    fn test_render_markdown_html() {
        let html = render_markdown_html("# Hello\n\nThis is **bold** text.");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_code_block() {
        let html = render_markdown_html("```rust\nfn main() {}\n```");
        assert!(html.contains("<pre>"));
        assert!(html.contains("<code"));
    }

    #[test]
    fn test_block_opens_once_then_updates_whole_text() {
        let mut sink = CapturedOutput::new();
        let mut block = MarkdownBlock::new();
        block.push("", &mut sink);
        block.push("# Ti", &mut sink);
        block.push("tle\n\nbody", &mut sink);

        assert_eq!(sink.events.len(), 2);
        let id = match &sink.events[0] {
            OutputEvent::Display { id, data } => {
                assert_eq!(data.markdown.as_deref(), Some("# Ti"));
                id.clone()
            }
            other => panic!("expected a display, got {:?}", other),
        };
        match &sink.events[1] {
            OutputEvent::Update { id: update_id, data } => {
                assert_eq!(update_id, &id);
                assert_eq!(data.plain, "# Title\n\nbody");
                assert!(data.html.as_deref().unwrap_or_default().contains("<h1>Title</h1>"));
            }
            other => panic!("expected an update, got {:?}", other),
        }
        assert_eq!(block.text(), "# Title\n\nbody");
    }
}
