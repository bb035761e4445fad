//! The tool-result envelope placed in tool-role message content (spec §3
//! `ToolEnvelope`, §6).

use super::scrub::scrub_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EArgs,
    ENotFound,
    ETimeout,
    EPolicy,
    EUnknownTool,
    EResultSchema,
    ETool,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EArgs => "E_ARGS",
            ErrorCode::ENotFound => "E_NOT_FOUND",
            ErrorCode::ETimeout => "E_TIMEOUT",
            ErrorCode::EPolicy => "E_POLICY",
            ErrorCode::EUnknownTool => "E_UNKNOWN_TOOL",
            ErrorCode::EResultSchema => "E_RESULT_SCHEMA",
            ErrorCode::ETool => "E_TOOL",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
}

/// `{ok, tool, data?, error?}` — always JSON, never omits `ok`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEnvelope {
    pub ok: bool,
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl ToolEnvelope {
    pub fn ok(tool: impl Into<String>, data: Value) -> Self {
        Self {
            ok: true,
            tool: tool.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Errors carry opaque, handler-authored or otherwise free-text messages
    /// (a failed request URL, a propagated `anyhow` chain, ...), so the
    /// message is scrubbed the same way a successful result's data would be
    /// before it lands in the envelope and the transcript.
    pub fn err(tool: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            tool: tool.into(),
            data: None,
            error: Some(EnvelopeError {
                code: code.as_str().to_string(),
                message: scrub_string(&message.into()),
            }),
        }
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"ok\":false,\"tool\":{:?},\"error\":{{\"code\":\"E_TOOL\",\"message\":\"envelope serialization failed\"}}}}",
                self.tool
            )
        })
    }
}

/// Classify an opaque handler error message into an envelope error code
/// (spec §4.8: a last-resort fallback when handlers return opaque strings).
pub fn classify_error(message: &str) -> ErrorCode {
    let lower = message.to_ascii_lowercase();
    if lower.contains("invalid args") || lower.contains("missing ") {
        ErrorCode::EArgs
    } else if lower.contains("not found") {
        ErrorCode::ENotFound
    } else if lower.contains("timeout") || lower.contains("deadline exceeded") {
        ErrorCode::ETimeout
    } else if lower.contains("forbidden") || lower.contains("disallow") {
        ErrorCode::EPolicy
    } else {
        ErrorCode::ETool
    }
}
