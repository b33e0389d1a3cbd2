//! An in-process stand-in for the page globals and the native bridge object.
//!
//! Native hosts that embed the gate directly drive [`MemoryEnvironment::inject`] themselves; tests use the same
//! hooks to play the part of the host.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
    time::Duration,
};

use futures_util::future::LocalBoxFuture;
use serde_json::Value;

use crate::{
    environment::{BridgeEnvironment, BridgeLoaded},
    handle::{BridgeHandle, NativeHandler, Responder, ResponseCallback},
    readiness::Readiness,
};

/// A [`BridgeEnvironment`] whose globals live in memory and whose timers run on tokio.
///
/// Clones share the same state, so one clone can be handed to a gate while another plays the host.
#[derive(Clone, Default)]
pub struct MemoryEnvironment {
    state: Rc<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    readiness: Cell<Readiness>,
    handle: RefCell<Option<Rc<dyn BridgeHandle>>>,
    waiting: RefCell<Vec<BridgeLoaded>>,
    unsupported: Cell<bool>,
    injection_requests: Cell<usize>,
    timers_started: Cell<usize>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment whose host already injected `handle`.
    pub fn with_handle(handle: Rc<dyn BridgeHandle>) -> Self {
        let env = Self::new();
        *env.state.handle.borrow_mut() = Some(handle);
        env
    }

    /// Mark this environment as a host that never provides the bridge.
    pub fn set_unsupported(&self, unsupported: bool) {
        self.state.unsupported.set(unsupported);
    }

    /// Write the readiness flag the way the host would, bypassing the gate.
    pub fn set_readiness(&self, readiness: Readiness) {
        self.state.readiness.set(readiness);
    }

    /// Inject `handle` and flush everyone waiting for it.
    pub fn inject(&self, handle: Rc<dyn BridgeHandle>) {
        *self.state.handle.borrow_mut() = Some(handle.clone());
        self.flush(Some(handle));
    }

    /// Answer outstanding injection requests with `handle` without making it globally visible.
    pub fn flush(&self, handle: Option<Rc<dyn BridgeHandle>>) {
        let waiting = std::mem::take(&mut *self.state.waiting.borrow_mut());
        for on_loaded in waiting {
            on_loaded(handle.clone());
        }
    }

    /// How many times a gate asked the host to inject the bridge.
    pub fn injection_requests(&self) -> usize {
        self.state.injection_requests.get()
    }

    /// How many timers have been started through [`BridgeEnvironment::sleep`].
    pub fn timers_started(&self) -> usize {
        self.state.timers_started.get()
    }
}

impl BridgeEnvironment for MemoryEnvironment {
    fn readiness(&self) -> Readiness {
        self.state.readiness.get()
    }

    fn store_readiness(&self, readiness: Readiness) {
        self.state.readiness.set(readiness);
    }

    fn injected_handle(&self) -> Option<Rc<dyn BridgeHandle>> {
        self.state.handle.borrow().clone()
    }

    fn request_injection(&self, on_loaded: BridgeLoaded) {
        self.state
            .injection_requests
            .set(self.state.injection_requests.get() + 1);
        self.state.waiting.borrow_mut().push(on_loaded);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        self.state
            .timers_started
            .set(self.state.timers_started.get() + 1);
        Box::pin(tokio::time::sleep(duration))
    }

    fn is_unsupported_host(&self) -> bool {
        self.state.unsupported.get()
    }
}

type Reply = Box<dyn Fn(Option<Value>) -> Option<Value>>;

/// A scriptable [`BridgeHandle`].
///
/// Calls to handlers with a reply installed through [`MemoryBridge::on_call`] are answered right away. All other
/// calls stay parked until [`MemoryBridge::answer`] or [`MemoryBridge::hang_up`].
#[derive(Default)]
pub struct MemoryBridge {
    replies: RefCell<HashMap<String, Reply>>,
    calls: RefCell<Vec<(String, Option<Value>)>>,
    parked: RefCell<Vec<(String, ResponseCallback)>>,
    handlers: RefCell<Vec<(String, NativeHandler)>>,
}

impl MemoryBridge {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Answer every call to `name` with whatever `reply` returns for its payload.
    pub fn on_call(
        &self,
        name: impl Into<String>,
        reply: impl Fn(Option<Value>) -> Option<Value> + 'static,
    ) {
        self.replies
            .borrow_mut()
            .insert(name.into(), Box::new(reply));
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<(String, Option<Value>)> {
        self.calls.borrow().clone()
    }

    /// Answer the oldest parked call to `name`. Returns false if there was none.
    pub fn answer(&self, name: &str, response: Option<Value>) -> bool {
        let callback = {
            let mut parked = self.parked.borrow_mut();
            match parked.iter().position(|(pending, _)| pending == name) {
                Some(idx) => parked.remove(idx).1,
                None => return false,
            }
        };
        callback(response);
        true
    }

    /// Drop every parked callback without answering it.
    pub fn hang_up(&self) {
        self.parked.borrow_mut().clear();
    }

    /// Names of the registered page handlers, in registration order.
    pub fn registered(&self) -> Vec<String> {
        self.handlers
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Invoke the page handler registered under `name`, collecting its answer if it gives one synchronously.
    ///
    /// Returns `None` if no such handler exists.
    pub fn invoke(&self, name: &str, data: Option<Value>) -> Option<Option<Value>> {
        let handler = self
            .handlers
            .borrow()
            .iter()
            .rev()
            .find(|(registered, _)| registered == name)
            .map(|(_, handler)| handler.clone())?;

        let answer = Rc::new(RefCell::new(None));
        let slot = answer.clone();
        handler(data, Responder::new(move |value| *slot.borrow_mut() = value));
        let response = answer.borrow_mut().take();
        Some(response)
    }
}

impl BridgeHandle for MemoryBridge {
    fn call_handler(&self, name: &str, data: Option<Value>, callback: ResponseCallback) {
        self.calls
            .borrow_mut()
            .push((name.to_string(), data.clone()));

        let reply = self.replies.borrow().get(name).map(|reply| reply(data));
        match reply {
            Some(response) => callback(response),
            None => self.parked.borrow_mut().push((name.to_string(), callback)),
        }
    }

    fn register_handler(&self, name: &str, handler: NativeHandler) {
        self.handlers
            .borrow_mut()
            .push((name.to_string(), handler));
    }
}
