//! Per-service tool registry (§4.1): name -> (input schema, handler).

use crate::error::ToolError;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;
pub type ToolFn = Arc<dyn Fn(Value) -> ToolFuture + Send + Sync>;

pub struct ToolEntry {
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolFn,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. `handler` is any async fn taking the already
    /// schema-checked arguments object and returning a JSON value or a
    /// `ToolError` for a framework-level fault (schema failures are caught
    /// by the caller before `handler` ever runs).
    pub fn register<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let name = name.into();
        self.tools.insert(
            name,
            ToolEntry {
                description: description.into(),
                input_schema,
                handler: Arc::new(move |args| Box::pin(handler(args))),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.tools.get(name)
    }

    pub fn list(&self) -> Vec<Value> {
        let mut names: Vec<_> = self.tools.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let entry = &self.tools[name];
                serde_json::json!({
                    "name": name,
                    "description": entry.description,
                    "inputSchema": entry.input_schema,
                })
            })
            .collect()
    }
}

/// Minimal structural validation: checks that every property flagged
/// `required` in a JSON-Schema-shaped `input_schema` object is present in
/// `args`. This is intentionally narrow — the analytical/execution
/// services validate business semantics themselves; the framework only
/// guards against missing required fields per §4.1.
pub fn validate_required(input_schema: &Value, args: &Value) -> Result<(), String> {
    let Some(required) = input_schema.get("required").and_then(Value::as_array) else {
        return Ok(());
    };
    let obj = args.as_object();
    for field in required {
        let Some(field_name) = field.as_str() else {
            continue;
        };
        let present = obj.map(|o| o.contains_key(field_name)).unwrap_or(false);
        if !present {
            return Err(format!("missing required field `{field_name}`"));
        }
    }
    Ok(())
}
