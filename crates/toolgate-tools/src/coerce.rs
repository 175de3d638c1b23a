// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument coercion from loosely-typed JSON to a parameter's declared type.
//!
//! LLMs frequently send `"5"` for an integer or `5` for a string. Coercion
//! accepts these where the conversion is lossless and rejects everything else.

use serde_json::{Number, Value};
use toolgate_core::{ParamType, ToolgateError};

/// Coerces `value` for parameter `name` to `ty`.
pub fn coerce(name: &str, ty: ParamType, value: Value) -> Result<Value, ToolgateError> {
    let coerced = match (ty, value) {
        (ParamType::Any, v) => Some(v),

        (ParamType::String, Value::String(s)) => Some(Value::String(s)),
        (ParamType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ParamType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

        (ParamType::Integer, Value::Number(n)) => integral(&n),
        (ParamType::Integer, Value::String(s)) => parse_integer(s.trim()),

        (ParamType::Number, Value::Number(n)) => Some(Value::Number(n)),
        (ParamType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),

        (ParamType::Boolean, Value::Bool(b)) => Some(Value::Bool(b)),
        (ParamType::Boolean, Value::String(s)) => match s.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },

        (ParamType::Object, v @ Value::Object(_)) => Some(v),
        (ParamType::Array, v @ Value::Array(_)) => Some(v),

        _ => None,
    };

    coerced.ok_or_else(|| {
        ToolgateError::InvalidArgument(format!("parameter `{name}` must be of type {ty}"))
    })
}

fn integral(n: &Number) -> Option<Value> {
    if n.is_i64() || n.is_u64() {
        return Some(Value::Number(n.clone()));
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn parse_integer(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Value::from(u));
    }
    None
}
