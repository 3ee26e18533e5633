use crate::config::SendMode;
use bytes::Bytes;
use multipeer_core::{Inbound, Payload};
use serde_json::Value;

/// Turns application payloads into transport frames and back.
///
/// Immediate mode sends one payload per frame. Batched mode sends one JSON
/// array of payloads per frame and expects the same from the remote side.
#[derive(Debug, Clone, Copy)]
pub struct MessageFramer {
    batched: bool,
}

impl MessageFramer {
    pub fn new(mode: SendMode) -> Self {
        Self {
            batched: mode.is_batched(),
        }
    }

    pub fn is_batched(&self) -> bool {
        self.batched
    }

    /// Frame a single payload. Text and raw payloads pass through untouched,
    /// as do structured values that are plain strings.
    pub fn encode(&self, payload: &Payload) -> serde_json::Result<Bytes> {
        match payload {
            Payload::Text(text) | Payload::Structured(Value::String(text)) => {
                Ok(Bytes::copy_from_slice(text.as_bytes()))
            }
            Payload::Raw(bytes) => Ok(bytes.clone()),
            Payload::Structured(value) => serde_json::to_vec(value).map(Bytes::from),
        }
    }

    /// Frame an ordered list of payloads destined to one peer.
    pub fn encode_batch(&self, payloads: &[Payload]) -> serde_json::Result<Bytes> {
        let list: Vec<Value> = payloads.iter().map(Payload::to_value).collect();
        serde_json::to_vec(&list).map(Bytes::from)
    }

    /// Decode one inbound transport frame into the messages it carries, in order.
    pub fn decode(&self, data: Bytes) -> serde_json::Result<Vec<Inbound>> {
        if self.batched {
            let list: Vec<Value> = serde_json::from_slice(&data)?;
            Ok(list.into_iter().map(Inbound::from).collect())
        } else {
            Ok(vec![decode_single(data)])
        }
    }
}

/// A frame whose first byte is `[` or `{` is tried as JSON; anything else,
/// or JSON that fails to parse, is delivered as text when valid UTF-8 and as
/// bytes otherwise.
///
/// Bare JSON scalars such as `42` or `true` never open with `[` or `{`, so
/// they arrive as text.
fn decode_single(data: Bytes) -> Inbound {
    if looks_structured(&data) {
        if let Ok(value) = serde_json::from_slice::<Value>(&data) {
            return Inbound::Structured(value);
        }
    }
    match std::str::from_utf8(&data) {
        Ok(text) => Inbound::Text(text.to_owned()),
        Err(_) => Inbound::Binary(data),
    }
}

pub(crate) fn looks_structured(data: &[u8]) -> bool {
    matches!(data.first(), Some(b'[') | Some(b'{'))
}
