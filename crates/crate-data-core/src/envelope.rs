//! Data state envelope
//!
//! Every record managed by the lifecycle service carries a `data_state` JSON
//! column holding audit metadata. Keys this crate does not know about are
//! preserved across updates.

use crate::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timestamp layout used for `event_time` and envelope fields
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current local time in [`TIMESTAMP_FORMAT`]
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl DataState {
    /// Envelope for a freshly created record
    pub fn created(at: impl Into<String>) -> Self {
        Self {
            created_at: Some(at.into()),
            status: Some("active".to_string()),
            ..Default::default()
        }
    }

    /// Decode the stored column value, either JSON text or an inline object
    pub fn from_stored(value: Option<&Value>) -> DataResult<Self> {
        match value {
            Some(Value::String(text)) => serde_json::from_str(text)
                .map_err(|e| DataError::EnvelopeDecode(format!("invalid data_state JSON: {e}"))),
            Some(object @ Value::Object(_)) => serde_json::from_value(object.clone())
                .map_err(|e| DataError::EnvelopeDecode(format!("invalid data_state object: {e}"))),
            Some(other) => Err(DataError::EnvelopeDecode(format!(
                "data_state must be a JSON object, got {other}"
            ))),
            None => Err(DataError::EnvelopeDecode("data_state is missing".to_string())),
        }
    }

    /// Stamp `updated_at`, and mark deprecated when requested
    pub fn touch(&mut self, at: impl Into<String>, deprecate: bool) {
        self.updated_at = Some(at.into());
        if deprecate {
            self.deprecated = Some(true);
        }
    }

    pub fn encode(&self) -> DataResult<String> {
        serde_json::to_string(self)
            .map_err(|e| DataError::EnvelopeDecode(format!("failed to encode data_state: {e}")))
    }
}
