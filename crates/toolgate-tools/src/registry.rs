// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool registry: discovery, argument binding and invocation.
//!
//! The registry is filled once at startup from each plugin's declarative tool
//! table and is read-only afterwards. Every call goes through the same path:
//! look up the tool, check the owning plugin is still active, bind each
//! parameter (coerce, default or reject), validate the bound object against
//! the tool's JSON Schema, then run the handler.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolgate_core::{
    ParamSpec, ParamType, PluginHandle, ToolArgs, ToolDescriptor, ToolFunction, ToolFuture,
    ToolHandler, ToolgateError,
};
use tracing::{debug, warn};

use crate::coerce::coerce;

/// One parameter of a registered tool, as advertised to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub name: String,
    pub json_type: ParamType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    pub description: String,
}

/// Public description of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub plugin_id: String,
    pub short_description: String,
    pub long_description: String,
    pub parameters: Vec<ParameterDefinition>,
    pub parameters_schema: Value,
}

impl ToolDefinition {
    /// OpenAI function-calling representation of this tool.
    pub fn to_openai(&self) -> Value {
        let description = if self.long_description.is_empty() {
            self.short_description.clone()
        } else {
            format!("{}\n\n{}", self.short_description, self.long_description)
        };
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": description,
                "parameters": self.parameters_schema,
            }
        })
    }
}

struct RegisteredTool {
    definition: ToolDefinition,
    validator: jsonschema::Validator,
    handler: ToolHandler,
    owner: Arc<PluginHandle>,
}

/// Registry of callable tools, keyed and ordered by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every tool function of an initialised plugin.
    ///
    /// Returns the number of tools registered. Tools whose schema does not
    /// compile are skipped; a plugin that is not active registers nothing.
    pub fn register_plugin(&mut self, handle: &Arc<PluginHandle>) -> usize {
        if !handle.is_active() {
            warn!(plugin = %handle.id(), state = %handle.state(), "not registering tools of inactive plugin");
            return 0;
        }

        let mut registered = 0;
        for function in handle.tools() {
            let name = function.descriptor.name.clone();
            match self.register_function(handle, function) {
                Ok(()) => registered += 1,
                Err(e) => warn!(plugin = %handle.id(), tool = %name, error = %e, "skipping tool"),
            }
        }
        debug!(plugin = %handle.id(), registered, "plugin tools registered");
        registered
    }

    /// Registers a single tool function owned by `owner`.
    ///
    /// A tool with the same name replaces the existing one.
    pub fn register_function(
        &mut self,
        owner: &Arc<PluginHandle>,
        function: ToolFunction,
    ) -> Result<(), ToolgateError> {
        let ToolFunction {
            descriptor,
            params,
            handler,
        } = function;

        if descriptor.name.trim().is_empty() {
            return Err(ToolgateError::plugin(owner.id(), "tool name must not be empty"));
        }

        let validator = jsonschema::validator_for(&descriptor.parameters_schema).map_err(|e| {
            ToolgateError::plugin(
                owner.id(),
                format!("schema of tool `{}` does not compile: {e}", descriptor.name),
            )
        })?;

        let definition = define(owner.id(), &descriptor, &params);
        let name = definition.name.clone();
        let previous = self.tools.insert(
            name.clone(),
            RegisteredTool {
                definition,
                validator,
                handler,
                owner: Arc::clone(owner),
            },
        );
        if let Some(previous) = previous {
            warn!(
                tool = %name,
                previous_plugin = %previous.owner.id(),
                plugin = %owner.id(),
                "tool name collision, last registration wins"
            );
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|t| &t.definition)
    }

    /// All tool definitions, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition.clone()).collect()
    }

    /// The catalogue as OpenAI function-calling tool entries, sorted by name.
    pub fn openai_tools(&self) -> Vec<Value> {
        self.tools.values().map(|t| t.definition.to_openai()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Binds and validates `args` for tool `name`, returning the handler's future.
    ///
    /// All argument errors are reported here, before anything runs.
    pub fn prepare_call(&self, name: &str, args: &Value) -> Result<ToolFuture, ToolgateError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolgateError::ToolNotFound {
                name: name.to_string(),
            })?;

        if !tool.owner.is_active() {
            return Err(ToolgateError::PluginUnavailable {
                plugin_id: tool.owner.id().to_string(),
            });
        }

        let supplied = match args {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => {
                return Err(ToolgateError::InvalidArgument(
                    "arguments must be a JSON object".to_string(),
                ));
            }
        };

        let (bound, checked) = bind(&tool.definition.parameters, supplied)?;

        let errors: Vec<String> = tool
            .validator
            .iter_errors(&checked)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect();
        if !errors.is_empty() {
            return Err(ToolgateError::InvalidArgument(errors.join("; ")));
        }

        Ok((tool.handler)(ToolArgs::new(bound)))
    }

    /// Invokes tool `name` and waits for its result.
    pub async fn invoke(&self, name: &str, args: &Value) -> Result<Value, ToolgateError> {
        self.prepare_call(name, args)?.await
    }

    /// Invokes tool `name` on its own task, bounded by `timeout`.
    ///
    /// On expiry the task is aborted and [`ToolgateError::ToolTimeout`] is
    /// returned. Abort takes effect at the tool's next await point; blocking
    /// work inside a handler may keep running and its result is discarded.
    pub async fn invoke_with_deadline(
        &self,
        name: &str,
        args: &Value,
        timeout: Duration,
    ) -> Result<Value, ToolgateError> {
        let call = self.prepare_call(name, args)?;
        let mut task = tokio::spawn(call);

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(ToolgateError::Internal(format!(
                "tool `{name}` did not complete: {join_err}"
            ))),
            Err(_) => {
                task.abort();
                warn!(tool = %name, timeout_ms = timeout.as_millis() as u64, "tool call timed out");
                Err(ToolgateError::ToolTimeout {
                    name: name.to_string(),
                    duration: timeout,
                })
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builds the public definition from a descriptor and the function signature.
fn define(plugin_id: &str, descriptor: &ToolDescriptor, params: &[ParamSpec]) -> ToolDefinition {
    let schema = &descriptor.parameters_schema;
    let properties = schema.get("properties").and_then(Value::as_object);
    let schema_required: Option<Vec<&str>> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect());

    let parameters = params
        .iter()
        .map(|param| {
            let property = properties.and_then(|p| p.get(&param.name));

            let json_type = property
                .and_then(|p| p.get("type"))
                .and_then(schema_type)
                .unwrap_or(param.ty);

            let default_value = param
                .default
                .clone()
                .or_else(|| property.and_then(|p| p.get("default")).cloned());

            let schema_optional = schema_required
                .as_ref()
                .is_some_and(|required| !required.contains(&param.name.as_str()));

            let description = descriptor
                .parameter_docs
                .iter()
                .find(|doc| doc.name == param.name)
                .map(|doc| doc.description.clone())
                .or_else(|| {
                    property
                        .and_then(|p| p.get("description"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_default();

            ParameterDefinition {
                name: param.name.clone(),
                json_type,
                required: default_value.is_none() && !schema_optional,
                default_value,
                description,
            }
        })
        .collect();

    ToolDefinition {
        name: descriptor.name.clone(),
        plugin_id: plugin_id.to_string(),
        short_description: descriptor.short_description.clone(),
        long_description: descriptor.long_description.clone(),
        parameters,
        parameters_schema: schema.clone(),
    }
}

/// Reads a JSON Schema `type`, which may be a string or a list like `["string", "null"]`.
fn schema_type(value: &Value) -> Option<ParamType> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .and_then(|t| t.parse().ok()),
        _ => None,
    }
}

/// Binds supplied arguments to parameters in declaration order.
///
/// Returns the handler arguments and the object to validate. A supplied key
/// is always coerced, explicit `null` included. Optional parameters bound to
/// `null` only because they were omitted are left out of the validated object,
/// so schemas need not allow `null` for them.
fn bind(
    parameters: &[ParameterDefinition],
    mut supplied: Map<String, Value>,
) -> Result<(Map<String, Value>, Value), ToolgateError> {
    let mut bound = Map::new();
    let mut checked = Map::new();

    for param in parameters {
        match (supplied.remove(&param.name), &param.default_value) {
            (Some(v), _) => {
                let v = coerce(&param.name, param.json_type, v)?;
                checked.insert(param.name.clone(), v.clone());
                bound.insert(param.name.clone(), v);
            }
            (None, Some(default)) => {
                checked.insert(param.name.clone(), default.clone());
                bound.insert(param.name.clone(), default.clone());
            }
            (None, None) if !param.required => {
                bound.insert(param.name.clone(), Value::Null);
            }
            (None, None) => {
                return Err(ToolgateError::InvalidArgument(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }
    }

    Ok((bound, Value::Object(checked)))
}
