use textwrap::core::display_width;

/// Terminal-style line wrapping for streamed fragments
///
/// The line under construction is redrawn with a carriage return every time
/// it grows, so output never exceeds `width` columns even though words
/// arrive in pieces.
#[derive(Debug, Clone)]
pub struct LineWrapper {
    width: usize,
    current_line: String,
    at_response_start: bool,
}

impl LineWrapper {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            current_line: String::new(),
            at_response_start: true,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Text of the line still being built
    pub fn current_line(&self) -> &str {
        &self.current_line
    }

    /// Feed one fragment, returning the chunks to write in order
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut pieces = fragment.split('\n').peekable();

        while let Some(piece) = pieces.next() {
            self.append(piece, &mut out);
            if pieces.peek().is_some() {
                out.push(format!("\r{}\n", self.current_line.trim_end()));
                self.current_line.clear();
            }
        }
        out
    }

    fn append(&mut self, text: &str, out: &mut Vec<String>) {
        if text.is_empty() {
            return;
        }

        let mut candidate = format!("{}{}", self.current_line, text);
        if candidate.trim().is_empty() {
            return;
        }
        if self.at_response_start {
            candidate = candidate.trim_start().to_string();
            self.at_response_start = false;
        }

        // One space is enough to keep the next fragment a separate word
        let trailing = if candidate.ends_with(char::is_whitespace) { " " } else { "" };
        let lines = textwrap::wrap(&candidate, self.width);
        let Some((last, complete)) = lines.split_last() else {
            return;
        };

        for (i, line) in complete.iter().enumerate() {
            let prefix = if i == 0 { "\r" } else { "" };
            out.push(format!("{}{}\n", prefix, line));
        }

        let prefix = if complete.is_empty() { "\r" } else { "" };
        let padding = self.width.saturating_sub(display_width(last));
        out.push(format!("{}{}{}", prefix, last, " ".repeat(padding)));

        self.current_line = format!("{}{}", last, trailing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(wrapper: &mut LineWrapper, fragments: &[&str]) -> Vec<String> {
        fragments.iter().flat_map(|f| wrapper.push(f)).collect()
    }

    fn collapse(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_fragments_across_words_and_newline() {
        let mut wrapper = LineWrapper::new(80);
        let out = feed(&mut wrapper, &["Hel", "lo wor", "ld\n", "Bye"]);

        let flushed: Vec<&String> = out.iter().filter(|chunk| chunk.ends_with('\n')).collect();
        assert_eq!(flushed, vec!["\rHello world\n"]);
        assert_eq!(wrapper.current_line(), "Bye");
        assert_eq!(out.last().unwrap(), &format!("\rBye{}", " ".repeat(77)));
    }

    #[test]
    fn test_redraw_is_padded_to_width() {
        let mut wrapper = LineWrapper::new(10);
        let out = wrapper.push("abc");
        assert_eq!(out, vec!["\rabc       "]);
    }

    #[test]
    fn test_single_newline_is_one_flush() {
        let mut wrapper = LineWrapper::new(20);
        wrapper.push("line");
        assert_eq!(wrapper.push("\n"), vec!["\rline\n"]);
        assert_eq!(wrapper.current_line(), "");
    }

    #[test]
    fn test_empty_fragment_is_noop() {
        let mut wrapper = LineWrapper::new(20);
        wrapper.push("kept");
        assert!(wrapper.push("").is_empty());
        assert_eq!(wrapper.current_line(), "kept");
    }

    #[test]
    fn test_whitespace_only_text_emits_nothing() {
        let mut wrapper = LineWrapper::new(20);
        assert!(wrapper.push("   ").is_empty());
        assert_eq!(wrapper.current_line(), "");
    }

    #[test]
    fn test_trailing_space_keeps_word_boundary() {
        let mut wrapper = LineWrapper::new(20);
        feed(&mut wrapper, &["Hello", " ", "world"]);
        assert_eq!(wrapper.current_line(), "Hello world");
    }

    #[test]
    fn test_trailing_whitespace_before_newline_stays_within_width() {
        let mut wrapper = LineWrapper::new(10);
        let out = feed(&mut wrapper, &["abcdefghij", "      ", "\n"]);
        assert_eq!(out.last().unwrap(), "\rabcdefghij\n");
        assert!(out.iter().all(|chunk| display_width(chunk.trim_matches(|c| c == '\r' || c == '\n')) <= 10));
    }

    #[test]
    fn test_trailing_whitespace_collapses_to_one_space() {
        let mut wrapper = LineWrapper::new(20);
        wrapper.push("word");
        for _ in 0..50 {
            wrapper.push(" ");
        }
        assert_eq!(wrapper.current_line(), "word ");

        wrapper.push("next");
        assert_eq!(wrapper.current_line(), "word next");
    }

    #[test]
    fn test_leading_spaces_stripped_from_first_line_only() {
        let mut wrapper = LineWrapper::new(20);
        let out = feed(&mut wrapper, &["   first\n", "  indented"]);
        assert_eq!(out[1], "\rfirst\n");
        assert_eq!(wrapper.current_line(), "  indented");
    }

    #[test]
    fn test_long_line_emits_complete_lines_then_redraw() {
        let mut wrapper = LineWrapper::new(10);
        let out = wrapper.push("one two three four");
        assert_eq!(out, vec!["\rone two\n", "three four"]);
        assert_eq!(wrapper.current_line(), "three four");
    }

    #[test]
    fn test_sublines_reconstitute_text() {
        let text = "The quick brown fox jumps over the lazy dog while  the cat watches from a sunny windowsill";
        let fragments: Vec<String> = text
            .as_bytes()
            .chunks(7)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect();

        for width in [12, 20, 33, 80] {
            let mut wrapper = LineWrapper::new(width);
            let mut lines: Vec<String> = Vec::new();
            for fragment in &fragments {
                for chunk in wrapper.push(fragment) {
                    if chunk.ends_with('\n') {
                        lines.push(chunk.trim_start_matches('\r').trim_end_matches('\n').to_string());
                    }
                }
            }
            lines.push(wrapper.current_line().to_string());

            assert!(lines.iter().all(|line| display_width(line) <= width + 1));
            assert!(lines[..lines.len() - 1].iter().all(|line| display_width(line) <= width));
            assert_eq!(collapse(&lines.join(" ")), collapse(text), "width {}", width);
        }
    }

    #[test]
    fn test_zero_width_is_clamped() {
        assert_eq!(LineWrapper::new(0).width(), 1);
    }
}
