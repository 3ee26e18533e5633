use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Outbound application message.
///
/// `Text` and `Raw` are handed to the transport untouched; `Structured`
/// is JSON-encoded first. `Raw` is the explicit opt-out from encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Raw(Bytes),
    Structured(Value),
}

impl Payload {
    pub fn structured<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Payload::Structured)
    }

    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Payload::Raw(bytes.into())
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Payload::Raw(_))
    }

    /// Value form used inside a batch frame. Raw bytes become an array of
    /// byte values since a batch is always one JSON document.
    pub fn to_value(&self) -> Value {
        match self {
            Payload::Text(text) => Value::String(text.clone()),
            Payload::Structured(value) => value.clone(),
            Payload::Raw(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_owned())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Structured(v)
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Raw(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Raw(Bytes::from(b))
    }
}

/// Decoded inbound application message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Text(String),
    Binary(Bytes),
    Structured(Value),
}

impl Inbound {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Inbound::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Inbound::Structured(value) => Some(value),
            _ => None,
        }
    }

    /// Deserialize a structured message into an application type.
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        match self {
            Inbound::Structured(value) => serde_json::from_value(value.clone()).ok(),
            Inbound::Text(text) => serde_json::from_str(text).ok(),
            Inbound::Binary(bytes) => serde_json::from_slice(bytes).ok(),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Inbound::Text(text) => Bytes::from(text),
            Inbound::Binary(bytes) => bytes,
            Inbound::Structured(value) => Bytes::from(value.to_string()),
        }
    }
}

impl From<Value> for Inbound {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Inbound::Text(text),
            other => Inbound::Structured(other),
        }
    }
}
