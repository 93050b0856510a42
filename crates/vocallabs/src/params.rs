//! Operation parameters.
//!
//! Values come from the node configuration first and fall back to the
//! incoming item, so upstream nodes can feed ids into a workflow without the
//! operator wiring every field.

use serde_json::{Map, Value};

use crate::validate::{ValidationError, Validated};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    primary: Map<String, Value>,
    fallback: Map<String, Value>,
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl Params {
    pub fn new(primary: Value, fallback: Value) -> Self {
        Self {
            primary: into_map(primary),
            fallback: into_map(fallback),
        }
    }

    pub fn from_value(value: Value) -> Self {
        Self::new(value, Value::Null)
    }

    /// Raw value; `null` in the primary source counts as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.primary
            .get(name)
            .filter(|v| !v.is_null())
            .or_else(|| self.fallback.get(name).filter(|v| !v.is_null()))
    }

    /// String form of a scalar parameter; empty when absent.
    pub fn str(&self, name: &str) -> String {
        match self.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Like [`Params::str`] but `None` for absent or blank values.
    pub fn opt_str(&self, name: &str) -> Option<String> {
        let value = self.str(name);
        (!value.trim().is_empty()).then_some(value)
    }

    /// Integer parameter. Numeric strings are accepted.
    pub fn i64_or(&self, name: &str, default: i64) -> Validated<i64> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };
        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) if s.trim().is_empty() => return Ok(default),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| ValidationError::new(format!("{name} must be a whole number, got {value}")))
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => default,
            },
            Some(Value::Number(n)) => n.as_i64().map_or(default, |n| n != 0),
            _ => default,
        }
    }

    /// Unparsed JSON parameter; `null` when absent.
    pub fn json(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }

    /// A list of strings: a JSON array, text holding one, or a single value.
    pub fn string_list(&self, name: &str) -> Validated<Vec<String>> {
        let items = match self.get(name) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items.clone(),
            Some(Value::String(s)) if s.trim_start().starts_with('[') => {
                match serde_json::from_str::<Value>(s) {
                    Ok(Value::Array(items)) => items,
                    _ => return Err(ValidationError::new(format!("Invalid JSON in {name}"))),
                }
            }
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(Vec::new()),
            Some(other) => vec![other.clone()],
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(ValidationError::new(format!(
                    "{name} must contain only strings, got {other}"
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_wins_and_input_fills_gaps() {
        let params = Params::new(
            json!({ "agent_id": "cfg", "limit": null }),
            json!({ "agent_id": "item", "limit": 25, "call_id": "c-1" }),
        );
        assert_eq!(params.str("agent_id"), "cfg");
        assert_eq!(params.i64_or("limit", 10), Ok(25));
        assert_eq!(params.str("call_id"), "c-1");
        assert_eq!(params.opt_str("missing"), None);
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        let params = Params::from_value(json!({ "a": "5", "b": 7.0, "c": "x", "d": "" }));
        assert_eq!(params.i64_or("a", 0), Ok(5));
        assert_eq!(params.i64_or("b", 0), Ok(7));
        assert!(params.i64_or("c", 0).is_err());
        assert_eq!(params.i64_or("d", 10), Ok(10));
    }

    #[test]
    fn booleans_and_lists() {
        let params = Params::from_value(json!({
            "flag": "true",
            "urls": ["https://a", "https://b"],
            "encoded": "[\"https://c\"]",
            "mixed": [1, "x"],
        }));
        assert!(params.bool_or("flag", false));
        assert!(!params.bool_or("absent", false));
        assert_eq!(params.string_list("urls").unwrap(), vec!["https://a", "https://b"]);
        assert_eq!(params.string_list("encoded").unwrap(), vec!["https://c"]);
        assert!(params.string_list("mixed").is_err());
        assert!(params.string_list("absent").unwrap().is_empty());
    }
}
