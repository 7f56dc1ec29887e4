//! Tool-Call Parser (spec §4.3): recovers tool invocations from free-text
//! model output when native tool calling isn't available.

use regex::Regex;
use serde_json::Value;

/// A tool call recovered from free text, prior to execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedToolCall {
    pub name: String,
    pub arguments: Value,
}

/// Extracts tool calls from assistant text, preferring (in order) fenced
/// JSON code blocks, inline JSON objects, then `<tool_call>` XML wrappers.
/// Stateless — every call recompiles its regexes, same as the config
/// validator's `regex::Regex::new` calls elsewhere in the workspace.
pub struct ToolCallParser;

impl ToolCallParser {
    pub fn parse(text: &str) -> Vec<ParsedToolCall> {
        let fenced = Self::parse_fenced_json(text);
        if !fenced.is_empty() {
            return fenced;
        }

        let inline = Self::parse_inline_json(text);
        if !inline.is_empty() {
            return inline;
        }

        Self::parse_xml(text)
    }

    fn parse_fenced_json(text: &str) -> Vec<ParsedToolCall> {
        let pattern = Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex");
        pattern
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .filter_map(|m| serde_json::from_str::<Value>(m.as_str()).ok())
            .filter_map(|v| extract_from_json(&v))
            .collect()
    }

    fn parse_inline_json(text: &str) -> Vec<ParsedToolCall> {
        find_json_objects(text)
            .into_iter()
            .filter_map(|s| serde_json::from_str::<Value>(&s).ok())
            .filter_map(|v| extract_from_json(&v))
            .collect()
    }

    fn parse_xml(text: &str) -> Vec<ParsedToolCall> {
        let pattern =
            Regex::new(r"(?s)<tool_call>\s*(\{.*?\})\s*</tool_call>").expect("valid regex");
        pattern
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .filter_map(|m| serde_json::from_str::<Value>(m.as_str()).ok())
            .filter_map(|v| extract_from_json(&v))
            .collect()
    }

    /// Whether `text` contains the configured completion marker literal.
    pub fn has_completion_marker(text: &str, marker: &str) -> bool {
        text.contains(marker)
    }

    /// Splits leading `<think>...</think>` blocks or "Let me / I will / ..."
    /// reasoning preambles from the remaining display content.
    ///
    /// Returns `(reasoning, remaining)`; `reasoning` is `None` if nothing
    /// was stripped.
    pub fn extract_thinking(text: &str) -> (Option<String>, String) {
        let lower = text.to_lowercase();
        if let Some(start) = lower.find("<think>") {
            if let Some(end) = lower.find("</think>") {
                if end > start {
                    let close = end + "</think>".len();
                    let reasoning = text[start..close].trim().to_string();
                    let remaining = format!("{}{}", &text[..start], &text[close..]);
                    return (Some(reasoning), remaining.trim().to_string());
                }
            }
        }

        let preamble = Regex::new(
            r"(?is)^(?:let me|i will|i'll|first,|here's what|my approach).*?(?=\{|```|$)",
        )
        .expect("valid regex");
        if let Some(m) = preamble.find(text) {
            let reasoning = m.as_str().trim().to_string();
            let remaining = text[m.end()..].trim().to_string();
            if !reasoning.is_empty() {
                return (Some(reasoning), remaining);
            }
        }

        (None, text.to_string())
    }
}

/// Recognizes one of the four tool-call key shapes and normalizes the
/// result into `{name, arguments}`.
fn extract_from_json(data: &Value) -> Option<ParsedToolCall> {
    let obj = data.as_object()?;

    if let (Some(name), Some(arguments)) = (obj.get("name"), obj.get("arguments")) {
        if let Some(name) = name.as_str() {
            return Some(ParsedToolCall {
                name: name.to_string(),
                arguments: normalize_arguments(arguments.clone()),
            });
        }
    }

    if let Some(function) = obj.get("function") {
        if let Some(name) = function.as_str() {
            if let Some(arguments) = obj.get("arguments") {
                return Some(ParsedToolCall {
                    name: name.to_string(),
                    arguments: normalize_arguments(arguments.clone()),
                });
            }
        }
        if let Some(func_obj) = function.as_object() {
            if let (Some(name), Some(arguments)) =
                (func_obj.get("name").and_then(Value::as_str), func_obj.get("arguments"))
            {
                return Some(ParsedToolCall {
                    name: name.to_string(),
                    arguments: normalize_arguments(arguments.clone()),
                });
            }
        }
    }

    if let Some(tool) = obj.get("tool").and_then(Value::as_str) {
        for key in ["args", "arguments", "input"] {
            if let Some(arguments) = obj.get(key) {
                return Some(ParsedToolCall {
                    name: tool.to_string(),
                    arguments: normalize_arguments(arguments.clone()),
                });
            }
        }
    }

    None
}

/// Re-parses string-valued arguments as JSON; falls back to `{"input": s}`
/// when the string isn't valid JSON.
fn normalize_arguments(value: Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str(&s).unwrap_or_else(|_| {
            let mut map = serde_json::Map::new();
            map.insert("input".to_string(), Value::String(s));
            Value::Object(map)
        }),
        other => other,
    }
}

/// Scans for balanced `{...}` objects, skipping brace characters inside
/// string literals, keeping only candidates that look like a tool call.
fn find_json_objects(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut results = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(s) = start.take() {
                            let candidate: String = chars[s..=i].iter().collect();
                            if ["\"name\"", "\"function\"", "\"tool\""]
                                .iter()
                                .any(|key| candidate.contains(key))
                            {
                                results.push(candidate);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_name_arguments_shape() {
        let text = "Sure, I'll do that.\n```json\n{\"name\": \"write_file\", \"arguments\": {\"path\": \"a.txt\", \"content\": \"hi\"}}\n```\n";
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "write_file");
        assert_eq!(calls[0].arguments["path"], "a.txt");
    }

    #[test]
    fn parses_inline_json_function_shape() {
        let text = r#"I will call {"function": "read_file", "arguments": {"path": "b.txt"}} now."#;
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "read_file");
    }

    #[test]
    fn parses_nested_function_object_shape() {
        let text = r#"{"function": {"name": "exec", "arguments": {"command": "ls"}}}"#;
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "exec");
        assert_eq!(calls[0].arguments["command"], "ls");
    }

    #[test]
    fn parses_tool_args_shape() {
        let text = r#"{"tool": "delegate", "args": {"agent": "huginn", "task": "write tests"}}"#;
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "delegate");
    }

    #[test]
    fn parses_tool_input_shape() {
        let text = r#"{"tool": "search", "input": {"query": "foo"}}"#;
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "search");
    }

    #[test]
    fn parses_xml_wrapper() {
        let text = "<tool_call>{\"name\": \"exec\", \"arguments\": {\"command\": \"pwd\"}}</tool_call>";
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "exec");
    }

    #[test]
    fn prefers_fenced_over_inline() {
        let text = "```json\n{\"name\": \"a\", \"arguments\": {}}\n```\nalso {\"name\": \"b\", \"arguments\": {}}";
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "a");
    }

    #[test]
    fn string_arguments_are_reparsed_as_json() {
        let text = r#"{"name": "exec", "arguments": "{\"command\": \"ls\"}"}"#;
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments["command"], "ls");
    }

    #[test]
    fn non_json_string_arguments_wrap_as_input() {
        let text = r#"{"name": "search", "arguments": "just a plain string"}"#;
        let calls = ToolCallParser::parse(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments["input"], "just a plain string");
    }

    #[test]
    fn prose_mentioning_name_alone_does_not_match() {
        let text = r#"The variable {"name": "x"} is just an example in prose."#;
        let calls = ToolCallParser::parse(text);
        assert!(calls.is_empty());
    }

    #[test]
    fn no_tool_calls_returns_empty_not_error() {
        let calls = ToolCallParser::parse("just a normal reply with no calls");
        assert!(calls.is_empty());
    }

    #[test]
    fn completion_marker_detection() {
        assert!(ToolCallParser::has_completion_marker(
            "all done <sindri:complete/>",
            "<sindri:complete/>"
        ));
        assert!(!ToolCallParser::has_completion_marker(
            "still working",
            "<sindri:complete/>"
        ));
    }

    #[test]
    fn extract_thinking_strips_think_block() {
        let text = "<think>I should write the file first</think>Writing now.";
        let (reasoning, remaining) = ToolCallParser::extract_thinking(text);
        assert_eq!(reasoning.as_deref(), Some("<think>I should write the file first</think>"));
        assert_eq!(remaining, "Writing now.");
    }

    #[test]
    fn extract_thinking_strips_preamble() {
        let text = "Let me check the file first. {\"name\": \"read_file\", \"arguments\": {}}";
        let (reasoning, remaining) = ToolCallParser::extract_thinking(text);
        assert!(reasoning.is_some());
        assert!(remaining.starts_with('{'));
    }

    #[test]
    fn extract_thinking_passthrough_when_no_markers() {
        let text = "a plain assistant reply";
        let (reasoning, remaining) = ToolCallParser::extract_thinking(text);
        assert!(reasoning.is_none());
        assert_eq!(remaining, text);
    }
}
