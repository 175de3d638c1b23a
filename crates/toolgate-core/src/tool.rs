// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative tool descriptors.
//!
//! A plugin exposes its callable surface as a table of [`ToolFunction`]s. Each
//! entry pairs a [`ToolDescriptor`] (what the LLM sees) with the function's own
//! parameter signature and an async handler. The tool registry inspects this
//! table at registration time; nothing is discovered by reflection.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::ToolgateError;

/// JSON type a tool parameter is coerced to before the handler runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    /// A structured value bound field-by-field onto a typed shape by the handler.
    Object,
    Array,
    /// No coercion; the JSON value is passed through.
    Any,
}

/// Human-readable documentation for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDoc {
    pub name: String,
    pub description: String,
}

/// The declarative descriptor attached to one tool function.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Tool name, unique across the registry.
    pub name: String,
    /// One-line summary for the tool catalogue.
    pub short_description: String,
    /// Longer usage notes; may be empty.
    pub long_description: String,
    /// JSON Schema for the argument object.
    pub parameters_schema: Value,
    /// Per-parameter documentation.
    pub parameter_docs: Vec<ParameterDoc>,
}

impl ToolDescriptor {
    /// Starts a descriptor with an empty object schema.
    pub fn new(name: impl Into<String>, short_description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_description: short_description.into(),
            long_description: String::new(),
            parameters_schema: serde_json::json!({ "type": "object", "properties": {} }),
            parameter_docs: Vec::new(),
        }
    }

    pub fn long_description(mut self, text: impl Into<String>) -> Self {
        self.long_description = text.into();
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.parameters_schema = schema;
        self
    }

    pub fn doc(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameter_docs.push(ParameterDoc {
            name: name.into(),
            description: description.into(),
        });
        self
    }
}

/// One parameter of a tool function's own signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamType,
    /// Default used when the caller omits the argument.
    pub default: Option<Value>,
}

impl ParamSpec {
    /// A parameter without a default.
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// A parameter that falls back to `default` when omitted.
    pub fn with_default(name: impl Into<String>, ty: ParamType, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default.into()),
        }
    }
}

/// Boxed future returned by tool handlers.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value, ToolgateError>> + Send>>;

/// Type-erased async tool handler.
pub type ToolHandler = Arc<dyn Fn(ToolArgs) -> ToolFuture + Send + Sync>;

/// A described, callable tool function.
#[derive(Clone)]
pub struct ToolFunction {
    pub descriptor: ToolDescriptor,
    pub params: Vec<ParamSpec>,
    pub handler: ToolHandler,
}

impl ToolFunction {
    /// Wraps an async closure as a tool function.
    pub fn new<F, Fut>(descriptor: ToolDescriptor, params: Vec<ParamSpec>, handler: F) -> Self
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolgateError>> + Send + 'static,
    {
        let handler: ToolHandler = Arc::new(move |args| Box::pin(handler(args)));
        Self {
            descriptor,
            params,
            handler,
        }
    }
}

impl std::fmt::Debug for ToolFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolFunction")
            .field("descriptor", &self.descriptor)
            .field("params", &self.params)
            .field("handler", &"<fn>")
            .finish()
    }
}

/// Arguments bound to a tool's parameters, after coercion and defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Raw bound value, `None` if the parameter was not bound.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserializes a bound argument into `T`.
    ///
    /// Structured arguments map JSON object fields onto `T` by name; fields `T`
    /// does not declare are ignored. An unbound parameter deserializes from
    /// `null`, so `Option<T>` reads as `None`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ToolgateError> {
        let value = self.values.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| ToolgateError::InvalidArgument(format!("parameter `{name}`: {e}")))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    fn args(value: Value) -> ToolArgs {
        match value {
            Value::Object(map) => ToolArgs::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn param_type_display_and_parse() {
        for ty in [
            ParamType::String,
            ParamType::Integer,
            ParamType::Number,
            ParamType::Boolean,
            ParamType::Object,
            ParamType::Array,
            ParamType::Any,
        ] {
            let parsed = ParamType::from_str(&ty.to_string()).expect("should parse back");
            assert_eq!(parsed, ty);
        }
        assert_eq!(ParamType::Integer.to_string(), "integer");
    }

    #[test]
    fn get_binds_structured_value_ignoring_extra_fields() {
        let a = args(json!({ "p": { "x": 1, "y": 2, "z": 99 } }));
        let p: Point = a.get("p").unwrap();
        assert_eq!(p, Point { x: 1, y: 2 });
    }

    #[test]
    fn get_unbound_as_option_is_none() {
        let a = args(json!({}));
        let v: Option<String> = a.get("missing").unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn get_wrong_shape_is_invalid_argument() {
        let a = args(json!({ "p": "nope" }));
        let err = a.get::<Point>("p").unwrap_err();
        assert!(matches!(err, ToolgateError::InvalidArgument(ref m) if m.contains("`p`")));
    }

    #[test]
    fn descriptor_builder_collects_docs() {
        let d = ToolDescriptor::new("sum", "Adds numbers")
            .long_description("Adds two integers")
            .doc("a", "first")
            .doc("b", "second");
        assert_eq!(d.parameter_docs.len(), 2);
        assert_eq!(d.parameters_schema["type"], "object");
    }

    #[tokio::test]
    async fn tool_function_handler_runs() {
        let f = ToolFunction::new(
            ToolDescriptor::new("echo", "Echo"),
            vec![ParamSpec::new("text", ParamType::String)],
            |args: ToolArgs| async move { Ok(args.raw("text").cloned().unwrap_or(Value::Null)) },
        );
        let out = (f.handler)(args(json!({ "text": "hi" }))).await.unwrap();
        assert_eq!(out, json!("hi"));
    }
}
