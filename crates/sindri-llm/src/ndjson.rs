//! Newline-delimited JSON buffering for the streaming chat endpoint.
//!
//! The local runtime's `/api/chat` streams one complete JSON object per
//! line rather than SSE `data:` frames, so draining is a plain line split
//! instead of `sindri-llm`'s predecessor's `\n\n`-delimited event parsing.

/// Drain complete lines from `buffer`, leaving any trailing partial line in
/// place for the next call.
pub(crate) fn drain_lines(buffer: &mut String) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    lines
}
