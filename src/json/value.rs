use std::fmt::{self, Display};

use crate::error::{Error, Result};
use crate::json::{number, ser, Object};

/// Any valid JSON value.
///
/// The tree is built fresh by every encode and consumed by every decode;
/// nothing inside it is shared between calls.
///
/// ```rust
/// use wirejson::json::{self, Value};
///
/// let value = json::from_str(r#"{ids: [1, 2], "name": "x"}"#).unwrap();
/// assert_eq!(value.get("ids"), Some(&Value::Array(vec![
///     Value::number("1").unwrap(),
///     Value::number("2").unwrap(),
/// ])));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    True,
    False,
    /// Literal text of a JSON number.
    Number(String),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

impl Default for Value {
    /// The default value is null.
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    /// Builds a `Number`, rejecting text outside the JSON number grammar.
    pub fn number(text: impl Into<String>) -> Result<Value> {
        let text = text.into();
        if number::is_valid(&text) {
            Ok(Value::Number(text))
        } else {
            Err(Error::InvalidNumber(text))
        }
    }

    pub fn string(text: impl Into<String>) -> Value {
        Value::String(text.into())
    }

    pub fn bool(b: bool) -> Value {
        if b {
            Value::True
        } else {
            Value::False
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Field lookup on objects, first occurrence wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(object) => object.get(name),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short description of the node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::True | Value::False => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl Display for Value {
    /// Compact JSON text. Invalid number payloads are shown as they are
    /// instead of failing, so errors can always print the offending tree.
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let mut out = String::new();
        ser::write_lossy(&mut out, self);
        formatter.write_str(&out)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;

    #[test]
    fn many_cases() {
        let cases = &[
            (Value::Null, "null"),
            (Value::True, "true"),
            (Value::Number("-1".to_owned()), "-1"),
            (Value::Number("1.0".to_owned()), "1.0"),
            (Value::string("a/b"), r#""a\/b""#),
            (
                Value::Array(vec![
                    Value::Number("1".to_owned()),
                    Value::Number("2".to_owned()),
                ]),
                "[1,2]",
            ),
            (
                Value::Object({
                    let mut object = Object::new();
                    object.insert("key", Value::Number("2".to_owned()));
                    object
                }),
                r#"{"key":2}"#,
            ),
        ];

        for (val, json) in cases {
            let actual = json::from_str(json).unwrap();
            assert_eq!(val, &actual);
        }

        for (val, json) in cases {
            let actual = json::to_string(val).unwrap();
            assert_eq!(json, &actual);
        }
    }

    #[test]
    fn number_constructor_validates() {
        assert!(Value::number("12.5").is_ok());
        assert!(matches!(Value::number("12,5"), Err(Error::InvalidNumber(_))));
    }

    #[test]
    fn display_never_fails() {
        let value = Value::Array(vec![Value::Number("oops".to_owned())]);
        assert_eq!(value.to_string(), "[oops]");
    }
}
