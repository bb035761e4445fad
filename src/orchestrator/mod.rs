//! Bounded tool-call orchestrator (spec §4.8): drives a chat/tool loop
//! against a [`ChatProvider`], enforcing a wall-clock budget and a cumulative
//! tool-call budget, validating tool results against their declared result
//! schema, and scrubbing secrets out of everything that lands in the
//! transcript.

pub mod envelope;
pub mod harmony;
pub mod provider;
pub mod scrub;

pub use envelope::{classify_error, ErrorCode, ToolEnvelope};
pub use harmony::ParsedTurn;
pub use provider::{ChatProvider, ChatResponse, Message, Role};

use crate::schema;
use crate::tools::{ToolCall, ToolRegistry};
use crate::utils::clock::{default_clock, Clock};
use anyhow::{anyhow, Context as _};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

#[cfg(test)]
mod tests;

/// Budgets and timeouts for one [`Orchestrator::run`] call (spec §4.8).
#[derive(Debug, Clone)]
pub struct RunBudget {
    /// Wall-clock deadline for the whole run.
    pub wall_clock: Duration,
    /// Per-tool-call timeout, capped by remaining wall-clock time.
    pub per_tool_timeout: Duration,
    /// Cumulative cap on tool calls across the run.
    pub max_tool_calls: u32,
}

impl Default for RunBudget {
    fn default() -> Self {
        Self {
            wall_clock: Duration::from_secs(120),
            per_tool_timeout: Duration::from_secs(10),
            max_tool_calls: 32,
        }
    }
}

pub struct Orchestrator {
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolRegistry>,
    budget: RunBudget,
    clock: Arc<dyn Clock>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn ChatProvider>, tools: Arc<ToolRegistry>, budget: RunBudget) -> Self {
        Self {
            provider,
            tools,
            budget,
            clock: default_clock(),
        }
    }

    /// Drive the chat/tool loop to completion: seed the transcript with
    /// `system`, `user`, and any `extra` messages, then alternate model turns
    /// with tool calls until a final answer is produced or a budget is
    /// exhausted.
    pub async fn run(
        &self,
        system: &str,
        user: &str,
        extra: &[Message],
    ) -> anyhow::Result<(String, Vec<Message>)> {
        let started = self.clock.now();
        let deadline = started
            + chrono::Duration::from_std(self.budget.wall_clock)
                .context("wall_clock budget too large for chrono::Duration")?;

        let mut transcript = vec![Message::system(system), Message::user(user)];
        transcript.extend_from_slice(extra);

        let tool_specs = self.tools.specs();
        let mut tool_calls_used: u32 = 0;

        loop {
            let remaining = deadline - self.clock.now();
            let remaining_std = remaining
                .to_std()
                .map_err(|_| anyhow!("wall clock budget exceeded before next model turn"))?;

            let response = timeout(remaining_std, self.provider.chat(&transcript, &tool_specs))
                .await
                .map_err(|_| anyhow!("wall clock budget exceeded waiting for model response"))??;

            match harmony::parse_turn(&response.content, &response.tool_calls) {
                ParsedTurn::Final(text) => {
                    transcript.push(Message::assistant(response.content.clone(), vec![]));
                    return Ok((text, transcript));
                }
                ParsedTurn::ToolCalls(calls) => {
                    transcript.push(Message::assistant(response.content.clone(), calls.clone()));

                    for call in calls {
                        if tool_calls_used >= self.budget.max_tool_calls {
                            return Err(anyhow!(
                                "max tool calls exceeded: budget is {}",
                                self.budget.max_tool_calls
                            ));
                        }
                        tool_calls_used += 1;

                        let remaining = deadline - self.clock.now();
                        let remaining_std = remaining
                            .to_std()
                            .map_err(|_| anyhow!("wall clock budget exceeded before tool call"))?;
                        let tool_deadline = remaining_std.min(self.budget.per_tool_timeout);

                        let envelope = self.dispatch_tool(&call, tool_deadline).await;
                        transcript.push(Message::tool(
                            call.name.clone(),
                            call.id.clone(),
                            envelope.to_json_string(),
                        ));
                    }
                }
            }
        }
    }

    /// Invoke one tool call under `deadline`, returning a result envelope
    /// (never an `Err` — failures are encoded as `{ok: false, error: {...}}`
    /// so the loop always has a transcript entry to append).
    async fn dispatch_tool(&self, call: &ToolCall, deadline: Duration) -> ToolEnvelope {
        let start = std::time::Instant::now();
        let args_hash = hex::encode(Sha256::digest(call.raw_json_arguments.as_bytes()));
        let args_bytes = call.raw_json_arguments.len();

        let envelope = self.dispatch_tool_inner(call, deadline).await;

        let duration_ms = start.elapsed().as_millis();
        let result_bytes = envelope.data.as_ref().map(|d| d.to_string().len()).unwrap_or(0);
        info!(
            stage = "tool",
            tool = %call.name,
            tool_call_id = %call.id,
            args_hash = %args_hash,
            args_bytes,
            result_bytes,
            ok = envelope.ok,
            duration_ms,
            "tool call completed"
        );

        envelope
    }

    async fn dispatch_tool_inner(&self, call: &ToolCall, deadline: Duration) -> ToolEnvelope {
        let Some(def) = self.tools.get(&call.name) else {
            return ToolEnvelope::err(
                call.name.clone(),
                ErrorCode::EUnknownTool,
                format!("no tool registered with name '{}'", call.name),
            );
        };

        let args: serde_json::Value = match serde_json::from_str(&call.raw_json_arguments) {
            Ok(v) => v,
            Err(e) => {
                return ToolEnvelope::err(
                    call.name.clone(),
                    ErrorCode::EArgs,
                    format!("invalid args: could not parse JSON arguments: {e}"),
                );
            }
        };

        if let Err(msg) = schema::validate(&def.args_schema, &args) {
            return ToolEnvelope::err(
                call.name.clone(),
                ErrorCode::EArgs,
                format!("invalid args: {msg}"),
            );
        }

        let handler_result = timeout(deadline, def.handler.invoke(args)).await;

        let result = match handler_result {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                let message = e.to_string();
                return ToolEnvelope::err(call.name.clone(), classify_error(&message), message);
            }
            Err(_) => {
                return ToolEnvelope::err(
                    call.name.clone(),
                    ErrorCode::ETimeout,
                    format!("tool '{}' exceeded its deadline", call.name),
                );
            }
        };

        let scrubbed = scrub::scrub_value(&result);

        if let Some(result_schema) = &def.result_schema {
            if let Err(msg) = schema::validate(result_schema, &scrubbed) {
                return ToolEnvelope::err(
                    call.name.clone(),
                    ErrorCode::EResultSchema,
                    format!("result failed schema validation: {msg}"),
                );
            }
        }

        ToolEnvelope::ok(call.name.clone(), scrubbed)
    }
}
