//! Script-side values
//!
//! Engine values are copied into [`ScriptValue`] before validation, so the
//! guard never holds a reference into the engine and can be tested without
//! one.

use rquickjs::Value;

/// Arrays longer than this are not copied; no binding takes one.
pub const MAX_ARRAY_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// `undefined`, `null`, or an argument that was never passed.
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ScriptValue>),
    /// Anything else, by kind name.
    Other(&'static str),
}

impl ScriptValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScriptValue::Nil => "nil",
            ScriptValue::Bool(_) => "boolean",
            ScriptValue::Number(_) => "number",
            ScriptValue::String(_) => "string",
            ScriptValue::Array(_) => "array",
            ScriptValue::Other(name) => name,
        }
    }

    pub fn from_js(value: &Value<'_>) -> Self {
        Self::convert(value, true)
    }

    fn convert(value: &Value<'_>, descend: bool) -> Self {
        if value.is_undefined() || value.is_null() {
            return ScriptValue::Nil;
        }
        if let Some(b) = value.as_bool() {
            return ScriptValue::Bool(b);
        }
        if let Some(n) = value.as_number() {
            return ScriptValue::Number(n);
        }
        if let Some(s) = value.as_string() {
            return s
                .to_string()
                .map(ScriptValue::String)
                .unwrap_or(ScriptValue::Other("string"));
        }
        if let Some(array) = value.as_array() {
            if !descend || array.len() > MAX_ARRAY_LEN {
                return ScriptValue::Other("array");
            }
            let items = (0..array.len())
                .map(|i| match array.get::<Value>(i) {
                    Ok(item) => Self::convert(&item, false),
                    Err(_) => ScriptValue::Other("unreadable"),
                })
                .collect();
            return ScriptValue::Array(items);
        }
        if value.is_function() {
            return ScriptValue::Other("function");
        }
        if value.is_symbol() {
            return ScriptValue::Other("symbol");
        }
        if value.is_object() {
            return ScriptValue::Other("object");
        }
        ScriptValue::Other("unknown")
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Number(n)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::String(s.to_string())
    }
}
