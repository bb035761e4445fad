use super::*;
use crate::tools::{ToolCall, ToolDefinition, ToolVersion};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

/// A provider that plays back a fixed script of responses, one per call.
struct ScriptedProvider {
    responses: Mutex<std::collections::VecDeque<ChatResponse>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn chat(&self, _messages: &[Message], _tools: &[crate::tools::ToolSpec]) -> anyhow::Result<ChatResponse> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted provider ran out of responses"))
    }
}

fn search_tool() -> ToolDefinition {
    ToolDefinition {
        stable_name: "web_search".to_string(),
        version: ToolVersion::default(),
        description: "search the web".to_string(),
        args_schema: json!({
            "type": "object",
            "properties": {"q": {"type": "string"}},
            "required": ["q"],
            "additionalProperties": false
        }),
        result_schema: None,
        capability_tags: vec![],
        handler: Arc::new(|args: serde_json::Value| async move {
            let q = args["q"].as_str().unwrap_or_default().to_string();
            Ok(json!({"results": [q]}))
        }),
    }
}

#[tokio::test]
async fn tool_loop_with_final_answer() {
    let mut registry = ToolRegistry::new();
    registry.register(search_tool()).unwrap();

    let tool_call = ToolCall {
        id: "call_1".to_string(),
        name: "web_search".to_string(),
        raw_json_arguments: r#"{"q":"rust async"}"#.to_string(),
    };

    let provider = ScriptedProvider::new(vec![
        ChatResponse {
            content: String::new(),
            tool_calls: vec![tool_call],
        },
        ChatResponse {
            content: "<final>Answer here</final>".to_string(),
            tool_calls: vec![],
        },
    ]);

    let orchestrator = Orchestrator::new(Arc::new(provider), Arc::new(registry), RunBudget::default());

    let (final_text, transcript) = orchestrator
        .run("you are a researcher", "what is rust async?", &[])
        .await
        .unwrap();

    assert_eq!(final_text, "Answer here");
    let roles: Vec<&str> = transcript.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "tool", "assistant"]);

    let tool_msg = &transcript[3];
    assert_eq!(tool_msg.tool_name.as_deref(), Some("web_search"));
    assert!(tool_msg.content.contains("\"ok\":true"));
}

#[tokio::test]
async fn budget_exhaustion_blocks_second_tool_call_without_invoking_it() {
    let mut registry = ToolRegistry::new();
    registry.register(search_tool()).unwrap();

    let call_a = ToolCall {
        id: "call_1".to_string(),
        name: "web_search".to_string(),
        raw_json_arguments: r#"{"q":"first"}"#.to_string(),
    };
    let call_b = ToolCall {
        id: "call_2".to_string(),
        name: "web_search".to_string(),
        raw_json_arguments: r#"{"q":"second"}"#.to_string(),
    };

    let provider = ScriptedProvider::new(vec![ChatResponse {
        content: String::new(),
        tool_calls: vec![call_a, call_b],
    }]);

    let budget = RunBudget {
        max_tool_calls: 1,
        ..RunBudget::default()
    };
    let orchestrator = Orchestrator::new(Arc::new(provider), Arc::new(registry), budget);

    let err = orchestrator
        .run("you are a researcher", "search twice", &[])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("max tool calls exceeded"));
}

#[tokio::test]
async fn unknown_tool_is_reported_without_aborting_the_run() {
    let registry = ToolRegistry::new();

    let call = ToolCall {
        id: "call_1".to_string(),
        name: "does_not_exist".to_string(),
        raw_json_arguments: "{}".to_string(),
    };

    let provider = ScriptedProvider::new(vec![
        ChatResponse {
            content: String::new(),
            tool_calls: vec![call],
        },
        ChatResponse {
            content: "<final>done</final>".to_string(),
            tool_calls: vec![],
        },
    ]);

    let orchestrator = Orchestrator::new(Arc::new(provider), Arc::new(registry), RunBudget::default());
    let (final_text, transcript) = orchestrator.run("sys", "go", &[]).await.unwrap();

    assert_eq!(final_text, "done");
    let tool_msg = &transcript[3];
    assert!(tool_msg.content.contains("E_UNKNOWN_TOOL"));
}
