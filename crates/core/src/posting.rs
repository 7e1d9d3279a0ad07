use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One job advertisement exactly as the source API returned it.
///
/// The record is kept as opaque JSON so unknown fields survive into the raw
/// payload. Accessors are lenient: a field that is absent or carries the
/// wrong JSON type reads as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPosting(Value);

impl RawPosting {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Posting identifier. Numbers are rendered as text; empty strings count
    /// as missing.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn company_name(&self) -> Option<&str> {
        self.nested_str("company", "display_name")
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// Source timestamp string, untouched.
    pub fn created(&self) -> Option<&str> {
        self.str_field("created")
    }

    pub fn location_name(&self) -> Option<&str> {
        self.nested_str("location", "display_name")
    }

    /// Compact JSON of the full original record.
    pub fn to_payload(&self) -> String {
        self.0.to_string()
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.as_str()
    }

    fn nested_str(&self, outer: &str, inner: &str) -> Option<&str> {
        self.0.get(outer)?.get(inner)?.as_str()
    }
}

impl From<Value> for RawPosting {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
