//! Typed tool catalog primitives (spec §3 `ToolDefinition`/`ToolCall`).

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;


/// Semantic version for a tool. Replacing a tool requires bumping this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl Default for ToolVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl std::fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn stable_name_pattern() -> &'static Regex {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap())
}

/// Handler invoked by the orchestrator for a given tool call. Modeled as a
/// trait object (rather than a bare function pointer) so handlers can carry
/// captured dependencies (an `Arc<FetchClient>`, a search provider client,
/// ...), matching spec §9's guidance on function-pointer handlers.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(&self, args: Value) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = anyhow::Result<Value>> + Send,
{
    async fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        (self)(args).await
    }
}

pub struct ToolDefinition {
    pub stable_name: String,
    pub version: ToolVersion,
    pub description: String,
    pub args_schema: Value,
    pub result_schema: Option<Value>,
    pub capability_tags: Vec<String>,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    /// Validate the invariants from spec §3: name matches
    /// `^[a-z][a-z0-9_]*$`, and `args_schema` is a JSON object.
    pub fn validate(&self) -> Result<(), String> {
        if !stable_name_pattern().is_match(&self.stable_name) {
            return Err(format!(
                "tool name '{}' does not match ^[a-z][a-z0-9_]*$",
                self.stable_name
            ));
        }
        if !self.args_schema.is_object() {
            return Err(format!(
                "tool '{}' args_schema must be a JSON object",
                self.stable_name
            ));
        }
        Ok(())
    }

    /// Description surfaced to the model, with a version suffix.
    pub fn description_with_version(&self) -> String {
        format!("{} (v{})", self.description, self.version)
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub raw_json_arguments: String,
}
