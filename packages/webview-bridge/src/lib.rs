//! WebView Bridge
//!
//! ## Overview
//! ------------
//! Pages hosted inside a native mobile application talk to the application through a bridge object the host
//! injects into the page (the `WebViewJavascriptBridge` convention). The host exposes two primitives on that
//! object: "call a named native handler with a payload and hand me the answer in a callback", and "register a
//! named page handler that native code can call later".
//!
//! This crate layers an async API on top of those primitives:
//! - [`BridgeGate::check_ready`] answers "can I talk to the host right now?", optionally polling for a while.
//! - [`BridgeGate::call`] performs one named call and decodes the host's `{"code", "data", "msg"}` envelope.
//! - [`BridgeGate::register`] lets the host call back into the page.
//! - A handful of named wrappers ([`BridgeGate::get_token`], [`BridgeGate::go_back`], ...) for call-site ergonomics.
//!
//! The crate itself never touches a browser. Everything platform specific (where the readiness flag lives, how the
//! bridge handle is found, how the host is asked to inject it, how to sleep) sits behind [`BridgeEnvironment`].
//! `webview-bridge-web` implements it for real pages; the `memory` feature provides [`MemoryEnvironment`] for
//! native hosts and tests.
//!
//! ## Execution model
//! ------------------
//! Everything here is single threaded. The gate shares its state through `Rc<RefCell<..>>` and every future it
//! hands out is `!Send`, matching the event loop of the page it runs in.
//!
//! ```rust, ignore
//! let gate = BridgeGate::new(env);
//! gate.check_ready(true).await?;
//! let token = gate.get_token().await?;
//! ```

mod config;
mod envelope;
mod environment;
mod error;
mod gate;
mod handle;
mod operations;
mod readiness;

#[cfg(feature = "memory")]
mod memory;

pub use config::BridgeConfig;
pub use envelope::{interpret_response, ResponseEnvelope, SUCCESS_CODE};
pub use environment::{BridgeEnvironment, BridgeLoaded};
pub use error::BridgeError;
pub use gate::{BridgeGate, PendingCall};
pub use handle::{BridgeHandle, NativeHandler, Responder, ResponseCallback};
pub use operations::{names, TopViewStatus, DEFAULT_MAX_IMAGES};
pub use readiness::Readiness;

#[cfg(feature = "memory")]
pub use memory::{MemoryBridge, MemoryEnvironment};

/// A result type for bridge operations.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
