use std::{rc::Rc, time::Duration};

use futures_util::future::LocalBoxFuture;

use crate::{handle::BridgeHandle, readiness::Readiness};

/// Called by the host once it has injected the bridge, with the handle it injected (if any).
pub type BridgeLoaded = Box<dyn FnOnce(Option<Rc<dyn BridgeHandle>>)>;

/// Everything the gate needs from the page it runs in.
///
/// On the web the readiness flag and the bridge handle are globals the native host writes to. Keeping them behind
/// this trait lets a gate run against a fresh in-memory environment instead.
pub trait BridgeEnvironment: 'static {
    /// The current value of the readiness flag.
    fn readiness(&self) -> Readiness;

    /// Overwrite the readiness flag. The gate only ever moves it out of [`Readiness::Unknown`].
    fn store_readiness(&self, readiness: Readiness);

    /// The bridge handle, if the host has already injected it.
    fn injected_handle(&self) -> Option<Rc<dyn BridgeHandle>>;

    /// Ask the host to inject the bridge and to call `on_loaded` once it has.
    ///
    /// Must not block the caller. The gate issues at most one request per pending queue. An environment that can
    /// never reach a host calls `on_loaded(None)` right away so queued work still settles.
    fn request_injection(&self, on_loaded: BridgeLoaded);

    /// A timer that fires after `duration`. Dropping it cancels the timer.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Whether the page runs inside a host that is known to never provide the bridge.
    fn is_unsupported_host(&self) -> bool {
        false
    }
}
