use std::rc::Rc;

use serde_json::Value;

/// Receives the raw answer of a native handler. `None` stands for `undefined`.
pub type ResponseCallback = Box<dyn FnOnce(Option<Value>)>;

/// A page handler the native host can invoke with a payload and a way to answer.
pub type NativeHandler = Rc<dyn Fn(Option<Value>, Responder)>;

/// The host-injected bridge object.
///
/// Owned by the native runtime; the page only ever holds a reference to it.
pub trait BridgeHandle {
    /// Invoke the native handler `name` with `data`. The host calls `callback` once it has an answer.
    fn call_handler(&self, name: &str, data: Option<Value>, callback: ResponseCallback);

    /// Make `handler` callable from native code under `name`.
    fn register_handler(&self, name: &str, handler: NativeHandler);
}

/// The host's response callback for a native-initiated call.
///
/// Answering is optional, and a responder can be answered at most once.
pub struct Responder {
    respond: Option<Box<dyn FnOnce(Option<Value>)>>,
}

impl Responder {
    pub fn new(respond: impl FnOnce(Option<Value>) + 'static) -> Self {
        Self {
            respond: Some(Box::new(respond)),
        }
    }

    /// A responder for hosts that did not ask for an answer.
    pub fn noop() -> Self {
        Self { respond: None }
    }

    /// Whether the host is waiting for an answer.
    pub fn expects_response(&self) -> bool {
        self.respond.is_some()
    }

    /// Send `value` back to the host.
    pub fn respond(mut self, value: impl Into<Option<Value>>) {
        if let Some(respond) = self.respond.take() {
            respond(value.into());
        }
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("expects_response", &self.expects_response())
            .finish()
    }
}
