//! Harmony final-answer parsing (spec §4.8 step 4, §6, §9).
//!
//! Two independent anchored patterns are recognized: a fenced block whose
//! info-string is exactly `final`, or `<final>...</final>`. We do not
//! attempt to parse chain-of-thought content.

use crate::tools::ToolCall;
use regex::Regex;
use std::sync::OnceLock;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
pub enum ParsedTurn {
    ToolCalls(Vec<ToolCall>),
    Final(String),
}

fn fenced_final_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\n?```final\s*\n(.*?)```").unwrap())
}

fn tag_final_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<final>(.*?)</final>").unwrap())
}

/// Extract tool calls and/or final text from one model turn.
///
/// If `tool_calls` is non-empty, `content` is ignored and the calls are
/// returned. Otherwise, the content is searched for a final marker; absent
/// one, the trimmed whole content is returned as final.
pub fn parse_turn(content: &str, tool_calls: &[ToolCall]) -> ParsedTurn {
    if !tool_calls.is_empty() {
        return ParsedTurn::ToolCalls(tool_calls.to_vec());
    }

    if let Some(caps) = fenced_final_pattern().captures(content) {
        return ParsedTurn::Final(caps[1].trim().to_string());
    }
    if let Some(caps) = tag_final_pattern().captures(content) {
        return ParsedTurn::Final(caps[1].trim().to_string());
    }
    ParsedTurn::Final(content.trim().to_string())
}
