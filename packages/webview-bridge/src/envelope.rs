use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::BridgeError;

/// The status code the host uses for a successful call.
pub const SUCCESS_CODE: i64 = 200;

/// The structured answer of a native handler: `{"code": 200, "data": ..., "msg": "..."}`.
///
/// `code` may be any JSON number and `msg` any JSON value; hosts are not consistent about either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub code: Number,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub msg: Value,
}

impl ResponseEnvelope {
    /// Whether the host reported success. `200` and `200.0` both count.
    pub fn is_success(&self) -> bool {
        self.code.as_f64() == Some(SUCCESS_CODE as f64)
    }

    /// The message, if the host sent a string.
    pub fn message(&self) -> Option<&str> {
        self.msg.as_str()
    }

    /// Resolve to the payload on success, or reject with the whole envelope.
    pub fn into_result(self) -> Result<Value, BridgeError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(BridgeError::Status(self))
        }
    }
}

impl std::fmt::Display for ResponseEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.msg {
            Value::Null => write!(f, "code {}", self.code),
            Value::String(msg) => write!(f, "code {}: {msg}", self.code),
            msg => write!(f, "code {}: {msg}", self.code),
        }
    }
}

/// Turn the raw value a native handler passed to its callback into the call's outcome.
///
/// A non-empty string is parsed as a [`ResponseEnvelope`]. Anything else is rejected as
/// [`BridgeError::EmptyResponse`], carrying the raw value or `""` when it was falsy.
pub fn interpret_response(response: Option<Value>) -> Result<Value, BridgeError> {
    match response {
        Some(Value::String(text)) if !text.is_empty() => {
            let envelope: ResponseEnvelope = serde_json::from_str(&text).map_err(|err| {
                tracing::warn!("malformed response from native handler: {err}");
                BridgeError::Malformed(err)
            })?;
            envelope.into_result()
        }
        other => Err(BridgeError::EmptyResponse(
            other
                .filter(is_truthy)
                .unwrap_or_else(|| Value::String(String::new())),
        )),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
