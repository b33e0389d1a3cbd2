use std::{cell::RefCell, rc::Rc};

use js_sys::Function;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use webview_bridge::{BridgeHandle, NativeHandler, Responder, ResponseCallback};

#[wasm_bindgen]
extern "C" {
    /// The object the native host injects as `window.WebViewJavascriptBridge`.
    #[derive(Debug, Clone)]
    pub type WebViewJavascriptBridge;

    #[wasm_bindgen(method, catch, js_name = callHandler)]
    fn call_handler(
        this: &WebViewJavascriptBridge,
        name: &str,
        data: &JsValue,
        callback: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = registerHandler)]
    fn register_handler(
        this: &WebViewJavascriptBridge,
        name: &str,
        handler: &JsValue,
    ) -> Result<(), JsValue>;
}

/// A [`BridgeHandle`] backed by the host-injected JavaScript object.
#[derive(Debug, Clone)]
pub struct JsBridgeHandle {
    bridge: WebViewJavascriptBridge,
}

impl JsBridgeHandle {
    /// Wrap `value` if it looks like an injected bridge.
    pub fn from_js(value: JsValue) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            bridge: value.unchecked_into(),
        })
    }

    pub(crate) fn shared(value: JsValue) -> Option<Rc<dyn BridgeHandle>> {
        Self::from_js(value).map(|handle| Rc::new(handle) as Rc<dyn BridgeHandle>)
    }
}

impl BridgeHandle for JsBridgeHandle {
    fn call_handler(&self, name: &str, data: Option<Value>, callback: ResponseCallback) {
        let data = data.as_ref().map(to_js).unwrap_or(JsValue::UNDEFINED);

        // Shared so a throwing host can still settle the call.
        let slot = Rc::new(RefCell::new(Some(callback)));
        let on_response = slot.clone();
        // Only the first answer counts; a host that answers twice must not hit a dead closure.
        let js_callback = Closure::<dyn FnMut(JsValue)>::new(move |response: JsValue| {
            let callback = on_response.borrow_mut().take();
            match callback {
                Some(callback) => callback(from_js(response)),
                None => tracing::debug!("ignoring a repeated answer from the native host"),
            }
        })
        .into_js_value();

        if let Err(err) = self.bridge.call_handler(name, &data, &js_callback) {
            tracing::warn!("native bridge threw while calling {name}: {err:?}");
            let callback = slot.borrow_mut().take();
            if let Some(callback) = callback {
                callback(None);
            }
        }
    }

    fn register_handler(&self, name: &str, handler: NativeHandler) {
        let closure = Closure::<dyn FnMut(JsValue, JsValue)>::new(
            move |data: JsValue, respond: JsValue| {
                let responder = match respond.dyn_into::<Function>() {
                    Ok(respond) => Responder::new(move |value| {
                        let value = value.as_ref().map(to_js).unwrap_or(JsValue::UNDEFINED);
                        if let Err(err) = respond.call1(&JsValue::NULL, &value) {
                            tracing::warn!("native response callback threw: {err:?}");
                        }
                    }),
                    Err(_) => Responder::noop(),
                };
                handler(from_js(data), responder);
            },
        );

        if let Err(err) = self.bridge.register_handler(name, closure.as_ref()) {
            tracing::warn!("native bridge threw while registering {name}: {err:?}");
            return;
        }

        // The host may call this handler at any point during the page's lifetime.
        closure.forget();
    }
}

/// Convert a value coming from the host. `undefined` maps to `None`, values without a JSON form to their description.
pub(crate) fn from_js(value: JsValue) -> Option<Value> {
    if value.is_undefined() {
        return None;
    }
    if let Some(text) = value.as_string() {
        return Some(Value::String(text));
    }
    match serde_wasm_bindgen::from_value(value.clone()) {
        Ok(value) => Some(value),
        Err(err) => {
            // functions, symbols and oversized BigInts have no JSON form; keep what they look like
            tracing::warn!("failed to convert JsValue to serde_json::Value - {err}");
            Some(Value::String(value.as_debug_string()))
        }
    }
}

/// Convert a value going to the host, using plain objects rather than `Map`s.
pub(crate) fn to_js(value: &Value) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or_else(|err| {
            tracing::warn!("failed to convert serde_json::Value to JsValue - {err}");
            JsValue::UNDEFINED
        })
}
