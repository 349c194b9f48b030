//! Raw text to typed value conversion, driven by the documented type.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The coercion rule selected by a free-form type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueType {
    Boolean,
    Number,
    String,
    /// `T[]` or `Array<T>`, holding `T` as written.
    Array(String),
    Object,
    Other,
}

impl ValueType {
    pub(crate) fn of(type_name: &str) -> Self {
        let t = type_name.trim();
        if let Some(inner) = t.strip_suffix("[]") {
            return Self::Array(inner.trim().to_string());
        }
        if let Some(inner) = t.strip_prefix("Array<").and_then(|r| r.strip_suffix('>')) {
            return Self::Array(inner.trim().to_string());
        }
        match t.to_ascii_lowercase().as_str() {
            "boolean" => Self::Boolean,
            "number" => Self::Number,
            "string" => Self::String,
            "object" => Self::Object,
            _ => Self::Other,
        }
    }

    pub(crate) fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

/// Coerce `raw` according to `type_name`.
pub fn get_value(raw: &str, type_name: &str) -> Result<Value> {
    coerce(raw, &ValueType::of(type_name))
}

pub(crate) fn coerce(raw: &str, value_type: &ValueType) -> Result<Value> {
    match value_type {
        ValueType::Boolean => to_boolean(raw).map(Value::Bool),
        ValueType::Number => to_number(raw),
        ValueType::String | ValueType::Other => Ok(Value::String(raw.to_string())),
        ValueType::Array(element) => to_array(raw, element),
        ValueType::Object => {
            let text = raw.trim();
            if text.is_empty() {
                Ok(Value::Object(Map::new()))
            } else {
                parse_literal(text)
            }
        }
    }
}

pub(crate) fn to_boolean(raw: &str) -> Result<bool> {
    let text = raw.trim();
    // Flag-style text: `--verbose`, `--no-verbose`, `-v`
    if text.starts_with('-') {
        return Ok(!text.trim_start_matches('-').starts_with("no-"));
    }
    let lower = text.to_ascii_lowercase();
    match lower.as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        l if l.starts_with("yes") => Ok(true),
        l if l.starts_with("no") => Ok(false),
        _ => Err(Error::InvalidBoolean(text.to_string())),
    }
}

fn to_number(raw: &str) -> Result<Value> {
    let text = raw.trim();
    let invalid = || Error::InvalidNumber(text.to_string());

    if !text.contains('.') {
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::from(int));
        }
    }
    // Decimals, plus exponent forms like `1e3`
    let float: f64 = text.parse().map_err(|_| invalid())?;
    if !float.is_finite() {
        return Err(invalid());
    }
    serde_json::Number::from_f64(float)
        .map(Value::Number)
        .ok_or_else(invalid)
}

fn to_array(raw: &str, element: &str) -> Result<Value> {
    let text = raw.trim();
    if text.starts_with('[') && text.ends_with(']') {
        return match parse_literal(text)? {
            Value::Array(items) => Ok(Value::Array(items)),
            other => Ok(Value::Array(vec![other])),
        };
    }
    if text.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    let element = ValueType::of(element);
    text.split(',')
        .map(|piece| coerce(piece.trim(), &element))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

/// Parse a JSON literal, falling back to JSON5 for JS-style literals
/// (`{retries: 3}`, `['a', 'b']`).
fn parse_literal(text: &str) -> Result<Value> {
    if let Ok(v) = serde_json::from_str(text) {
        return Ok(v);
    }
    json_five::from_str::<Value>(text).map_err(|e| Error::InvalidLiteral {
        text: text.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_type_strings() {
        assert_eq!(ValueType::of("boolean"), ValueType::Boolean);
        assert_eq!(ValueType::of(" Number "), ValueType::Number);
        assert_eq!(ValueType::of("string[]"), ValueType::Array("string".into()));
        assert_eq!(ValueType::of("Array<number>"), ValueType::Array("number".into()));
        assert_eq!(ValueType::of("Object"), ValueType::Object);
        assert_eq!(ValueType::of("Promise<void>"), ValueType::Other);
        assert_eq!(ValueType::of(""), ValueType::Other);
    }

    #[test]
    fn booleans_from_flags() {
        assert_eq!(get_value("--no-verbose", "boolean").unwrap(), json!(false));
        assert_eq!(get_value("--verbose", "boolean").unwrap(), json!(true));
        assert_eq!(get_value("-v", "boolean").unwrap(), json!(true));
        assert_eq!(get_value("-no-cache", "boolean").unwrap(), json!(false));
    }

    #[test]
    fn booleans_from_literals() {
        for yes in ["true", "TRUE", "1", "yes", "Yessir"] {
            assert_eq!(get_value(yes, "boolean").unwrap(), json!(true), "{}", yes);
        }
        for no in ["false", "False", "0", "no", "nope"] {
            assert_eq!(get_value(no, "boolean").unwrap(), json!(false), "{}", no);
        }
        assert!(matches!(
            get_value("maybe", "boolean"),
            Err(Error::InvalidBoolean(t)) if t == "maybe"
        ));
    }

    #[test]
    fn numbers() {
        assert_eq!(get_value("42", "number").unwrap(), json!(42));
        assert_eq!(get_value("-7", "number").unwrap(), json!(-7));
        assert_eq!(get_value("2.5", "number").unwrap(), json!(2.5));
        assert_eq!(get_value("1e3", "number").unwrap(), json!(1000.0));
        assert!(matches!(get_value("abc", "number"), Err(Error::InvalidNumber(_))));
        assert!(matches!(get_value("inf", "number"), Err(Error::InvalidNumber(_))));
        assert!(matches!(get_value("1.2.3", "number"), Err(Error::InvalidNumber(_))));
    }

    #[test]
    fn strings_and_unknown_types_are_identity() {
        assert_eq!(get_value("hello world", "string").unwrap(), json!("hello world"));
        assert_eq!(get_value("12", "Date").unwrap(), json!("12"));
    }

    #[test]
    fn arrays_split_on_commas() {
        assert_eq!(get_value("a,b,c", "string[]").unwrap(), json!(["a", "b", "c"]));
        assert_eq!(get_value("1, 2", "Array<number>").unwrap(), json!([1, 2]));
        assert_eq!(get_value("", "string[]").unwrap(), json!([]));
        assert!(matches!(get_value("1,x", "number[]"), Err(Error::InvalidNumber(_))));
    }

    #[test]
    fn arrays_from_literals() {
        assert_eq!(get_value("[1,2]", "number[]").unwrap(), json!([1, 2]));
        assert_eq!(get_value("['a', 'b']", "string[]").unwrap(), json!(["a", "b"]));
        assert!(matches!(
            get_value("[1,", "number[]"),
            Err(Error::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn objects() {
        assert_eq!(get_value("", "object").unwrap(), json!({}));
        assert_eq!(get_value(r#"{"a": 1}"#, "object").unwrap(), json!({"a": 1}));
        let js_style = get_value("{retries: 3, name: 'x'}", "Object").unwrap();
        assert_eq!(js_style["retries"].as_f64(), Some(3.0));
        assert_eq!(js_style["name"], json!("x"));
        assert!(matches!(
            get_value("{oops", "object"),
            Err(Error::InvalidLiteral { .. })
        ));
    }
}
