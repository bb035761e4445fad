use super::*;
use crate::tools::base::{ToolDefinition, ToolHandler, ToolVersion};
use serde_json::Value;
use std::sync::Arc;

fn def(name: &str) -> ToolDefinition {
    ToolDefinition {
        stable_name: name.to_string(),
        version: ToolVersion::default(),
        description: format!("tool {name}"),
        args_schema: serde_json::json!({"type": "object"}),
        result_schema: None,
        capability_tags: vec!["network".to_string()],
        handler: Arc::new(|_args: Value| async { Ok(Value::Null) }) as Arc<dyn ToolHandler>,
    }
}

#[test]
fn register_and_get() {
    let mut registry = ToolRegistry::new();
    registry.register(def("web_search")).unwrap();
    assert!(registry.get("web_search").is_some());
    assert!(registry.get("missing").is_none());
}

#[test]
fn rejects_invalid_name() {
    let mut registry = ToolRegistry::new();
    let result = registry.register(def("WebSearch"));
    assert!(result.is_err());
    assert_eq!(registry.len(), 0);
}

#[test]
fn specs_are_lexicographically_ordered() {
    let mut registry = ToolRegistry::new();
    registry.register(def("web_search")).unwrap();
    registry.register(def("web_fetch")).unwrap();
    registry.register(def("alpha_tool")).unwrap();
    let names: Vec<_> = registry.specs().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["alpha_tool", "web_fetch", "web_search"]);
}

#[test]
fn re_registering_replaces() {
    let mut registry = ToolRegistry::new();
    registry.register(def("web_search")).unwrap();
    registry.register(def("web_search")).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn catalog_includes_version_and_tags() {
    let mut registry = ToolRegistry::new();
    registry.register(def("web_search")).unwrap();
    let catalog = registry.catalog();
    assert_eq!(catalog[0].0, "web_search");
    assert_eq!(catalog[0].1, "1.0.0");
    assert_eq!(catalog[0].2, &["network".to_string()]);
}
