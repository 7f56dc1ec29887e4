//! Streaming Buffer (spec §4.3): consumes a model's token stream, hiding
//! the raw text of any recognized tool-call wrapper from the caller while
//! it's mid-flight, and yields the full set of detected tool calls once
//! the stream ends.

use crate::calls::{ParsedToolCall, ToolCallParser};

/// Tracks brace depth (string-aware) across token boundaries to know when
/// a `{...}` tool-call candidate opened by this token stream has closed.
#[derive(Debug, Default)]
pub struct StreamingBuffer {
    raw: String,
    depth: usize,
    in_tool_block: bool,
    in_string: bool,
    escaped: bool,
}

impl StreamingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one token. Returns `(display_text, in_tool_block)`:
    /// `display_text` is the subset of this token's characters that are
    /// safe to show immediately (outside any open brace); `in_tool_block`
    /// reflects whether the buffer is, after this token, still inside an
    /// unbalanced `{...}` span.
    pub fn add_token(&mut self, token: &str) -> (String, bool) {
        self.raw.push_str(token);
        let mut display = String::new();

        for c in token.chars() {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                if self.depth == 0 {
                    display.push(c);
                }
                continue;
            }

            match c {
                '"' => {
                    self.in_string = true;
                    if self.depth == 0 {
                        display.push(c);
                    }
                }
                '{' => {
                    if self.depth == 0 {
                        self.in_tool_block = true;
                    }
                    self.depth += 1;
                }
                '}' => {
                    if self.depth > 0 {
                        self.depth -= 1;
                        if self.depth == 0 {
                            self.in_tool_block = false;
                        }
                    }
                }
                _ => {
                    if self.depth == 0 {
                        display.push(c);
                    }
                }
            }
        }

        (display, self.in_tool_block)
    }

    /// The full accumulated text seen so far, fences and all.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Runs the Tool-Call Parser over everything accumulated so far.
    /// Call once the stream's `done` signal arrives.
    pub fn finish(&self) -> Vec<ParsedToolCall> {
        ToolCallParser::parse(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through_unsuppressed() {
        let mut buf = StreamingBuffer::new();
        let (display, in_block) = buf.add_token("hello world");
        assert_eq!(display, "hello world");
        assert!(!in_block);
    }

    #[test]
    fn tool_call_braces_are_suppressed_until_closed() {
        let mut buf = StreamingBuffer::new();
        let (d1, b1) = buf.add_token("Sure. ");
        assert_eq!(d1, "Sure. ");
        assert!(!b1);

        let (d2, b2) = buf.add_token("{\"name\": \"exec\", ");
        assert_eq!(d2, "");
        assert!(b2);

        let (d3, b3) = buf.add_token("\"arguments\": {}}");
        assert_eq!(d3, "");
        assert!(!b3);

        let (d4, b4) = buf.add_token(" done.");
        assert_eq!(d4, " done.");
        assert!(!b4);
    }

    #[test]
    fn nested_braces_track_depth() {
        let mut buf = StreamingBuffer::new();
        buf.add_token("{\"name\": \"exec\", \"arguments\": {\"nested\": {\"a\": 1}}}");
        assert!(!buf.in_tool_block);
        assert_eq!(buf.depth, 0);
    }

    #[test]
    fn braces_inside_string_literals_do_not_affect_depth() {
        let mut buf = StreamingBuffer::new();
        let (_, in_block) = buf.add_token("{\"name\": \"echo\", \"arguments\": {\"text\": \"a { b\"}}");
        assert!(!in_block);
    }

    #[test]
    fn finish_parses_accumulated_text() {
        let mut buf = StreamingBuffer::new();
        buf.add_token("Writing now. ");
        buf.add_token("{\"name\": \"write_file\", \"arguments\": {\"path\": \"a.txt\", \"content\": \"hi\"}}");
        let calls = buf.finish();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "write_file");
    }

    #[test]
    fn finish_with_no_tool_calls_is_empty() {
        let mut buf = StreamingBuffer::new();
        buf.add_token("just chatting, nothing to call");
        assert!(buf.finish().is_empty());
    }
}
