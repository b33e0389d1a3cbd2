use serde_json::Value;

use crate::envelope::ResponseEnvelope;

/// Everything that can go wrong while talking to the native host.
///
/// Every failure of the async API surfaces as one of these. Nothing is retried; callers own their retry policy.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The readiness flag is confirmed unready, or the probe was asked not to wait.
    #[error("the native bridge is not ready")]
    NotReady,

    /// The page runs inside a host that never provides the bridge.
    #[error("the host environment does not support the native bridge")]
    UnsupportedHost,

    /// The readiness probe used up its polling budget.
    #[error("gave up waiting for the native bridge after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// The host answered with a non-success status. The whole envelope is kept for inspection.
    #[error("native handler failed: {0}")]
    Status(ResponseEnvelope),

    /// The host answered with text that is not a response envelope.
    #[error("malformed response from native handler: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The host answered with nothing, an empty string or a non-string value.
    ///
    /// Carries the raw value, or an empty string when the value was falsy.
    #[error("empty response from native handler: {0}")]
    EmptyResponse(Value),

    /// The call succeeded but its `data` did not have the requested shape.
    #[error("failed to decode native handler result: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// The host dropped the response callback without ever answering.
    #[error("the native host dropped the response callback")]
    Disconnected,
}

impl BridgeError {
    /// Whether this error means the bridge itself is unavailable, as opposed to a failed call.
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            Self::NotReady | Self::UnsupportedHost | Self::Timeout { .. }
        )
    }

    /// The status envelope, if the host answered with a non-success code.
    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            Self::Status(envelope) => Some(envelope),
            _ => None,
        }
    }
}
