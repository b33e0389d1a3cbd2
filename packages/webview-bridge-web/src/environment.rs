use std::{rc::Rc, time::Duration};

use futures_util::future::LocalBoxFuture;
use gloo_timers::{callback::Timeout, future::TimeoutFuture};
use js_sys::{Array, Reflect};
use wasm_bindgen::prelude::*;
use webview_bridge::{BridgeEnvironment, BridgeGate, BridgeHandle, BridgeLoaded, Readiness};

use crate::{cfg::WebBridgeConfig, handle::JsBridgeHandle};

/// The global the host (or this crate) sets to `true`/`false` once readiness is known.
pub const READY_FLAG_GLOBAL: &str = "isBridgeReady";

/// The global the host injects the bridge object under.
pub const BRIDGE_GLOBAL: &str = "WebViewJavascriptBridge";

/// The global queue of callbacks the host flushes once the bridge is injected.
pub const CALLBACKS_GLOBAL: &str = "WVJBCallbacks";

/// The page's globals, as seen by a [`BridgeGate`].
pub struct WebEnvironment {
    config: WebBridgeConfig,
}

impl WebEnvironment {
    pub fn new(config: WebBridgeConfig) -> Self {
        Self { config }
    }

    /// A gate over this page's globals.
    pub fn gate(config: WebBridgeConfig) -> BridgeGate<Self> {
        let bridge = config.bridge.clone();
        BridgeGate::with_config(Self::new(config), bridge)
    }

    pub fn config(&self) -> &WebBridgeConfig {
        &self.config
    }

    fn global(&self, key: &str) -> JsValue {
        web_sys::window()
            .and_then(|window| Reflect::get(&window, &JsValue::from_str(key)).ok())
            .unwrap_or(JsValue::UNDEFINED)
    }

    /// Navigate a hidden frame to the injection URL so the host notices the page wants the bridge.
    ///
    /// Runs on a later tick, and the frame is always detached again on the tick after.
    fn send_injection_signal(&self, window: web_sys::Window) {
        let Some(document) = window.document() else {
            tracing::warn!("no document to signal the host from");
            return;
        };
        let url = self.config.injection_url.clone();

        Timeout::new(0, move || {
            let frame = match document.create_element("iframe") {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::warn!("failed to create the bridge injection frame: {err:?}");
                    return;
                }
            };
            _ = frame.set_attribute("style", "display: none");
            _ = frame.set_attribute("src", &url);

            match document.document_element() {
                Some(root) => {
                    if let Err(err) = root.append_child(&frame) {
                        tracing::warn!("failed to attach the bridge injection frame: {err:?}");
                    }
                }
                None => tracing::warn!("document has no root element to attach the injection frame to"),
            }

            Timeout::new(0, move || frame.remove()).forget();
        })
        .forget();
    }
}

impl BridgeEnvironment for WebEnvironment {
    fn readiness(&self) -> Readiness {
        let flag = self.global(READY_FLAG_GLOBAL);
        if flag.is_truthy() {
            Readiness::Ready
        } else if flag.as_bool() == Some(false) {
            Readiness::Unready
        } else {
            Readiness::Unknown
        }
    }

    fn store_readiness(&self, readiness: Readiness) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let flag = readiness
            .as_flag()
            .map(JsValue::from_bool)
            .unwrap_or(JsValue::UNDEFINED);
        if let Err(err) = Reflect::set(&window, &JsValue::from_str(READY_FLAG_GLOBAL), &flag) {
            tracing::warn!("failed to store the bridge readiness flag: {err:?}");
        }
    }

    fn injected_handle(&self) -> Option<Rc<dyn BridgeHandle>> {
        let bridge = self.global(BRIDGE_GLOBAL);
        if !bridge.is_truthy() {
            return None;
        }
        JsBridgeHandle::shared(bridge)
    }

    fn request_injection(&self, on_loaded: BridgeLoaded) {
        let Some(window) = web_sys::window() else {
            tracing::warn!("no window to request the bridge from, flushing without a bridge");
            on_loaded(None);
            return;
        };

        let callback = Closure::once_into_js(move |bridge: JsValue| {
            on_loaded(JsBridgeHandle::shared(bridge));
        });

        // Someone else on the page already asked; the host flushes their queue and ours with it.
        let key = JsValue::from_str(CALLBACKS_GLOBAL);
        let queue = Reflect::get(&window, &key).unwrap_or(JsValue::UNDEFINED);
        if Array::is_array(&queue) {
            tracing::trace!("joining the existing bridge callback queue");
            queue.unchecked_into::<Array>().push(&callback);
            return;
        }

        if let Err(err) = Reflect::set(&window, &key, &Array::of1(&callback)) {
            tracing::warn!("failed to publish the bridge callback queue: {err:?}");
            return;
        }

        self.send_injection_signal(window);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        Box::pin(TimeoutFuture::new(millis))
    }

    fn is_unsupported_host(&self) -> bool {
        web_sys::window()
            .and_then(|window| window.navigator().user_agent().ok())
            .is_some_and(|agent| self.config.is_unsupported_user_agent(&agent))
    }
}
