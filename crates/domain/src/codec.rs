//! Wire codec shared by every API record.
//!
//! Records are plain serde structs; this module adds the decode/encode entry
//! points with a structured "malformed payload" error and logging. Decoding
//! never falls back to defaults: a missing or mistyped required field, a
//! mistyped optional field or an unknown enumeration value rejects the whole
//! record.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

/// Untyped JSON at the API boundary (metadata, payloads, details).
pub type JsonValue = serde_json::Value;

/// JSON object with string keys.
pub type JsonMap = serde_json::Map<String, JsonValue>;

/// Errors raised by the wire codec.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed {record} payload: {source}")]
    Decode {
        record: &'static str,
        source: serde_json::Error,
    },

    #[error("Failed to encode {record}: {source}")]
    Encode {
        record: &'static str,
        source: serde_json::Error,
    },

    #[error("{record} does not encode to a JSON object")]
    NotAnObject { record: &'static str },
}

impl WireError {
    /// Name of the record type that failed.
    pub fn record(&self) -> &'static str {
        match self {
            WireError::Decode { record, .. }
            | WireError::Encode { record, .. }
            | WireError::NotAnObject { record } => record,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, WireError::Decode { .. })
    }
}

/// Short type name used in errors and logs (`UserSession`, `Page`).
pub fn record_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let head = full.split('<').next().unwrap_or(full);
    head.rsplit("::").next().unwrap_or(head)
}

fn decode_error<T>(source: serde_json::Error) -> WireError {
    let record = record_name::<T>();
    warn!(record, error = %source, "Rejected malformed payload");
    WireError::Decode { record, source }
}

/// Encode/decode entry points, implemented for every serde record.
pub trait WireRecord: Serialize + DeserializeOwned {
    fn from_json(value: JsonValue) -> Result<Self, WireError> {
        serde_json::from_value(value).map_err(decode_error::<Self>)
    }

    fn from_json_map(map: JsonMap) -> Result<Self, WireError> {
        Self::from_json(JsonValue::Object(map))
    }

    fn from_json_str(raw: &str) -> Result<Self, WireError> {
        serde_json::from_str(raw).map_err(decode_error::<Self>)
    }

    fn to_json(&self) -> Result<JsonValue, WireError> {
        serde_json::to_value(self).map_err(|source| WireError::Encode {
            record: record_name::<Self>(),
            source,
        })
    }

    fn to_json_map(&self) -> Result<JsonMap, WireError> {
        match self.to_json()? {
            JsonValue::Object(map) => Ok(map),
            _ => Err(WireError::NotAnObject {
                record: record_name::<Self>(),
            }),
        }
    }

    fn to_json_string(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(|source| WireError::Encode {
            record: record_name::<Self>(),
            source,
        })
    }
}

impl<T> WireRecord for T where T: Serialize + DeserializeOwned {}
