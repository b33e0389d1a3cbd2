use std::{
    cell::RefCell,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};

use futures_channel::oneshot;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::BridgeConfig,
    envelope::interpret_response,
    environment::BridgeEnvironment,
    error::BridgeError,
    handle::{BridgeHandle, NativeHandler, Responder},
    readiness::Readiness,
};

type Continuation = Box<dyn FnOnce(Option<Rc<dyn BridgeHandle>>)>;

/// The page's single point of contact with the native host.
///
/// Cloning a gate is cheap; clones share the pending queue and the environment.
pub struct BridgeGate<E: BridgeEnvironment> {
    inner: Rc<GateInner<E>>,
}

struct GateInner<E> {
    env: E,
    config: BridgeConfig,
    state: RefCell<GateState>,
}

#[derive(Default)]
struct GateState {
    /// Continuations waiting for the host to inject the bridge. `Some` while an injection request is outstanding.
    pending: Option<Vec<Continuation>>,

    /// The handle the host delivered through the injection callback.
    loaded: Option<Rc<dyn BridgeHandle>>,
}

impl<E: BridgeEnvironment> Clone for BridgeGate<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: BridgeEnvironment> BridgeGate<E> {
    pub fn new(env: E) -> Self {
        Self::with_config(env, BridgeConfig::default())
    }

    pub fn with_config(env: E, config: BridgeConfig) -> Self {
        Self {
            inner: Rc::new(GateInner {
                env,
                config,
                state: RefCell::new(GateState::default()),
            }),
        }
    }

    pub fn environment(&self) -> &E {
        &self.inner.env
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// The current value of the readiness flag.
    pub fn readiness(&self) -> Readiness {
        self.inner.env.readiness()
    }

    /// Whether injection has been requested and continuations are still waiting on it.
    pub fn is_injection_pending(&self) -> bool {
        self.inner.state.borrow().pending.is_some()
    }

    /// Run `continuation` with the bridge handle as soon as the host has injected it.
    ///
    /// If the handle is already there the continuation runs right away. Otherwise it is queued, and the first queued
    /// continuation also asks the host to inject the bridge. Queued continuations run in the order they were queued.
    pub fn setup(&self, continuation: impl FnOnce(Option<Rc<dyn BridgeHandle>>) + 'static) {
        if let Some(handle) = self.current_handle() {
            continuation(Some(handle));
            return;
        }

        let mut state = self.inner.state.borrow_mut();
        if let Some(pending) = state.pending.as_mut() {
            pending.push(Box::new(continuation));
            tracing::trace!(queued = pending.len(), "bridge not injected yet, queued continuation");
            return;
        }

        state.pending = Some(vec![Box::new(continuation)]);
        drop(state);

        tracing::debug!("requesting bridge injection from the host");
        let gate = Rc::downgrade(&self.inner);
        self.inner.env.request_injection(Box::new(move |handle| {
            if let Some(inner) = gate.upgrade() {
                BridgeGate { inner }.bridge_loaded(handle);
            }
        }));
    }

    /// Wait for the host to inject the bridge.
    ///
    /// Unlike [`BridgeGate::check_ready`] this never times out.
    pub async fn bridge(&self) -> Option<Rc<dyn BridgeHandle>> {
        let (tx, rx) = oneshot::channel();
        self.setup(move |handle| {
            _ = tx.send(handle);
        });
        rx.await.ok().flatten()
    }

    /// Entry point for the host once the bridge is injected.
    ///
    /// Consumes the pending queue exactly once, handing `handle` to every queued continuation in order. A live handle
    /// also settles an unknown readiness flag to [`Readiness::Ready`].
    pub fn bridge_loaded(&self, handle: Option<Rc<dyn BridgeHandle>>) {
        let pending = {
            let mut state = self.inner.state.borrow_mut();
            if handle.is_some() {
                state.loaded = handle.clone();
            }
            state.pending.take()
        };

        if handle.is_some() {
            self.settle(Readiness::Ready);
        }

        let Some(pending) = pending else {
            tracing::trace!("bridge loaded with nothing queued");
            return;
        };

        tracing::debug!(
            count = pending.len(),
            injected = handle.is_some(),
            "bridge loaded, flushing queued continuations"
        );
        for continuation in pending {
            continuation(handle.clone());
        }
    }

    /// Check whether the bridge is ready.
    ///
    /// Resolves right away when the flag is already set. When it is still unknown and `wait` is true, the flag is
    /// polled on the configured interval; the probe gives up after the configured number of attempts and pins the
    /// flag to [`Readiness::Unready`].
    pub async fn check_ready(&self, wait: bool) -> Result<(), BridgeError> {
        match self.readiness() {
            Readiness::Ready => return Ok(()),
            Readiness::Unready => return Err(BridgeError::NotReady),
            Readiness::Unknown => {}
        }

        if self.inner.env.is_unsupported_host() {
            tracing::debug!("host never provides the bridge, marking it unready");
            self.settle(Readiness::Unready);
            return Err(BridgeError::UnsupportedHost);
        }

        if !wait {
            return Err(BridgeError::NotReady);
        }

        let BridgeConfig {
            poll_interval,
            max_attempts,
        } = self.inner.config.clone();

        for attempt in 1..=max_attempts {
            self.inner.env.sleep(poll_interval).await;
            if self.readiness() == Readiness::Ready {
                tracing::debug!(attempt, "bridge became ready");
                return Ok(());
            }
        }

        tracing::debug!(attempts = max_attempts, "bridge readiness probe timed out");
        self.settle(Readiness::Unready);
        Err(BridgeError::Timeout {
            attempts: max_attempts,
        })
    }

    /// Call the native handler `name` with `data`.
    ///
    /// The call is issued immediately, queued behind bridge injection if necessary; the returned future only
    /// delivers the outcome. There is no timeout: the future settles when the host answers.
    pub fn call(&self, name: &str, data: Option<Value>) -> PendingCall {
        let (tx, call) = PendingCall::from_parts();
        let name = name.to_string();

        self.setup(move |bridge| {
            let Some(bridge) = bridge else {
                tracing::debug!(handler = %name, "no bridge handle, resolving with an empty result");
                _ = tx.send(Ok(Value::String(String::new())));
                return;
            };

            tracing::debug!(handler = %name, "calling native handler");
            bridge.call_handler(
                &name,
                data,
                Box::new(move |response| {
                    _ = tx.send(interpret_response(response));
                }),
            );
        });

        call
    }

    /// Like [`BridgeGate::call`], decoding the result into `T`.
    pub fn call_as<T: DeserializeOwned + 'static>(
        &self,
        name: &str,
        data: Option<Value>,
    ) -> impl Future<Output = Result<T, BridgeError>> + 'static {
        let call = self.call(name, data);
        async move { serde_json::from_value(call.await?).map_err(BridgeError::Deserialize) }
    }

    /// Make `handler` callable from native code under `name` once the bridge is injected.
    pub fn register(
        &self,
        name: impl Into<String>,
        handler: impl Fn(Option<Value>, Responder) + 'static,
    ) {
        let name = name.into();
        let handler: NativeHandler = Rc::new(handler);

        self.setup(move |bridge| match bridge {
            Some(bridge) => {
                tracing::debug!(handler = %name, "registering handler for the native host");
                bridge.register_handler(&name, handler);
            }
            None => tracing::warn!(handler = %name, "no bridge handle, handler not registered"),
        });
    }

    fn current_handle(&self) -> Option<Rc<dyn BridgeHandle>> {
        self.inner
            .env
            .injected_handle()
            .or_else(|| self.inner.state.borrow().loaded.clone())
    }

    /// Move the flag out of `Unknown`. A terminal flag is left alone.
    fn settle(&self, readiness: Readiness) -> Readiness {
        let current = self.inner.env.readiness();
        if current.is_terminal() {
            return current;
        }
        self.inner.env.store_readiness(readiness);
        readiness
    }
}

/// The outcome of a native call issued with [`BridgeGate::call`].
#[derive(Debug)]
#[must_use = "the call is issued either way, but its outcome is lost unless awaited"]
pub struct PendingCall {
    rx: oneshot::Receiver<Result<Value, BridgeError>>,
}

impl PendingCall {
    fn from_parts() -> (oneshot::Sender<Result<Value, BridgeError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A call that already failed before reaching the host.
    pub fn failed(error: BridgeError) -> Self {
        let (tx, call) = Self::from_parts();
        _ = tx.send(Err(error));
        call
    }
}

impl Future for PendingCall {
    type Output = Result<Value, BridgeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx.poll_unpin(cx).map(|res| {
            res.unwrap_or_else(|_| {
                tracing::warn!("native host dropped the response callback");
                Err(BridgeError::Disconnected)
            })
        })
    }
}
