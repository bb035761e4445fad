//! `ToolRegistry` (spec §4.6): a typed catalog of callable tools keyed by
//! stable name, returned in lexicographic order for deterministic
//! reproducibility and manifests.

use crate::tools::base::ToolDefinition;
use std::collections::BTreeMap;
use tracing::warn;

#[cfg(test)]
mod tests;

/// A catalog entry summary surfaced to callers building a chat-completion
/// request (name, versioned description, args schema).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub args_schema: serde_json::Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the definition, then insert (or replace, with a warning) by
    /// `stable_name`.
    pub fn register(&mut self, def: ToolDefinition) -> Result<(), String> {
        def.validate()?;
        if self.tools.contains_key(&def.stable_name) {
            warn!(
                tool = def.stable_name,
                "tool registry: replacing existing tool registration"
            );
        }
        self.tools.insert(def.stable_name.clone(), def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Tool specs in lexicographic order by `stable_name`.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|def| ToolSpec {
                name: def.stable_name.clone(),
                description: def.description_with_version(),
                args_schema: def.args_schema.clone(),
            })
            .collect()
    }

    /// Full catalog (name, version, capability tags) in lexicographic order.
    pub fn catalog(&self) -> Vec<(&str, String, &[String])> {
        self.tools
            .values()
            .map(|def| {
                (
                    def.stable_name.as_str(),
                    def.version.to_string(),
                    def.capability_tags.as_slice(),
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
