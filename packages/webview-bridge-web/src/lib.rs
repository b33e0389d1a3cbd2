//! Web-sys binding of `webview-bridge` for pages hosted inside a native WebView.
//!
//! The native host talks to the page through three globals:
//! - `window.WebViewJavascriptBridge`: the injected bridge object.
//! - `window.isBridgeReady`: `true`/`false` once readiness is known, absent before that.
//! - `window.WVJBCallbacks`: callbacks the host flushes with the bridge once it has injected it.
//!
//! This crate reads and writes those globals through [`WebEnvironment`] and exposes a page-wide [`BridgeGate`]
//! through free functions mirroring the host's handler catalog.
//!
//! ```rust, ignore
//! use webview_bridge_web as bridge;
//!
//! bridge::register_handler("onResume", |_, _| tracing::info!("back in the foreground"));
//!
//! if bridge::check_bridge_ready(true).await.is_ok() {
//!     let user = bridge::get_token().await?;
//! }
//! ```

use std::cell::RefCell;

use serde_json::Value;

mod cfg;
mod environment;
mod handle;

pub use cfg::{WebBridgeConfig, DEFAULT_INJECTION_URL, WECHAT_USER_AGENT};
pub use environment::{WebEnvironment, BRIDGE_GLOBAL, CALLBACKS_GLOBAL, READY_FLAG_GLOBAL};
pub use handle::{JsBridgeHandle, WebViewJavascriptBridge};
pub use webview_bridge::{
    names, BridgeConfig, BridgeError, BridgeGate, PendingCall, Readiness, Responder, ResponseEnvelope,
    TopViewStatus, DEFAULT_MAX_IMAGES,
};

thread_local! {
    static PAGE_BRIDGE: RefCell<Option<BridgeGate<WebEnvironment>>> = const { RefCell::new(None) };
}

/// Configure the page-wide bridge.
///
/// Only takes effect before the first use of [`bridge`] or any of the free functions; returns false otherwise.
pub fn configure(config: WebBridgeConfig) -> bool {
    PAGE_BRIDGE.with(|page| {
        let mut page = page.borrow_mut();
        if page.is_some() {
            tracing::warn!("the page bridge is already in use, ignoring new configuration");
            return false;
        }
        *page = Some(WebEnvironment::gate(config));
        true
    })
}

/// The page-wide bridge gate.
pub fn bridge() -> BridgeGate<WebEnvironment> {
    PAGE_BRIDGE.with(|page| {
        page.borrow_mut()
            .get_or_insert_with(|| WebEnvironment::gate(WebBridgeConfig::default()))
            .clone()
    })
}

/// See [`BridgeGate::check_ready`].
pub async fn check_bridge_ready(wait: bool) -> Result<(), BridgeError> {
    let gate = bridge();
    gate.check_ready(wait).await
}

/// See [`BridgeGate::call`].
pub fn call_handler(name: &str, data: Option<Value>) -> PendingCall {
    bridge().call(name, data)
}

/// See [`BridgeGate::register`].
pub fn register_handler(name: impl Into<String>, handler: impl Fn(Option<Value>, Responder) + 'static) {
    bridge().register(name, handler)
}

pub fn call_camera_or_photo(max_images: u32) -> PendingCall {
    bridge().call_camera_or_photo(max_images)
}

pub fn get_token() -> PendingCall {
    bridge().get_token()
}

pub fn go_back() -> PendingCall {
    bridge().go_back()
}

pub fn close_web() -> PendingCall {
    bridge().close_web()
}

pub fn top_view_status(status: TopViewStatus) -> PendingCall {
    bridge().top_view_status(status)
}
