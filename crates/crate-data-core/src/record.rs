//! Record model shared by every dialect
//!
//! A [`Record`] is a flat mapping from column name to a JSON scalar. Rows read
//! back from a store are normalized so that integers, text and blobs all arrive
//! as strings, which keeps responses identical across dialects.

use serde_json::Value;
use std::fmt;

/// Flat column-name to scalar mapping
pub type Record = serde_json::Map<String, Value>;

/// A single bound statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlParam {
    /// Textual form of the value, `None` for SQL NULL
    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlParam::Null => None,
            SqlParam::Bool(b) => Some(b.to_string()),
            SqlParam::Int(i) => Some(i.to_string()),
            SqlParam::Float(f) => Some(f.to_string()),
            SqlParam::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

/// Converts a payload value into a bindable parameter.
///
/// Nested arrays and objects are bound as their JSON text, matching how JSON
/// columns such as `data_state` are stored.
impl From<&Value> for SqlParam {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqlParam::Null,
            Value::Bool(b) => SqlParam::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlParam::Int(i),
                None => n
                    .as_f64()
                    .map(SqlParam::Float)
                    .unwrap_or_else(|| SqlParam::Text(n.to_string())),
            },
            Value::String(s) => SqlParam::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlParam::Text(value.to_string()),
        }
    }
}

/// SQL text plus its ordered parameter list
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlQuery {
    pub fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} params)", self.sql, self.params.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_values_become_params() {
        assert_eq!(SqlParam::from(&json!(null)), SqlParam::Null);
        assert_eq!(SqlParam::from(&json!(true)), SqlParam::Bool(true));
        assert_eq!(SqlParam::from(&json!(42)), SqlParam::Int(42));
        assert_eq!(SqlParam::from(&json!(1.5)), SqlParam::Float(1.5));
        assert_eq!(SqlParam::from(&json!("x")), SqlParam::Text("x".into()));
    }

    #[test]
    fn test_nested_values_bind_as_json_text() {
        let param = SqlParam::from(&json!({"a": [1, 2]}));
        assert_eq!(param, SqlParam::Text(r#"{"a":[1,2]}"#.into()));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(SqlParam::Null.as_text(), None);
        assert_eq!(SqlParam::Int(-3).as_text().as_deref(), Some("-3"));
        assert_eq!(SqlParam::Bool(false).as_text().as_deref(), Some("false"));
    }
}
