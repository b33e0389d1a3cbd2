//! Named calls into the native host's handler catalog.

use serde_json::Value;

use crate::{environment::BridgeEnvironment, gate::BridgeGate, gate::PendingCall};

/// Handler names the native host registers.
pub mod names {
    pub const CALL_CAMERA_OR_PHOTO: &str = "callCameraOrPhoto";
    pub const GET_USER: &str = "getUser";
    pub const GO_BACK: &str = "goBack";
    pub const CLOSE_WEB: &str = "closeWeb";
    pub const TOP_VIEW_STATUS: &str = "topViewStatus";
}

/// How many images the camera/photo picker allows unless told otherwise.
pub const DEFAULT_MAX_IMAGES: u32 = 3;

/// Visibility of the host's navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopViewStatus {
    Show,
    Hide,
}

impl TopViewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
        }
    }
}

impl std::fmt::Display for TopViewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<E: BridgeEnvironment> BridgeGate<E> {
    /// Open the camera or photo picker, allowing up to `max_images` images.
    pub fn call_camera_or_photo(&self, max_images: u32) -> PendingCall {
        self.call(names::CALL_CAMERA_OR_PHOTO, Some(Value::from(max_images)))
    }

    /// [`BridgeGate::call_camera_or_photo`] with [`DEFAULT_MAX_IMAGES`].
    pub fn call_camera_or_photo_default(&self) -> PendingCall {
        self.call_camera_or_photo(DEFAULT_MAX_IMAGES)
    }

    /// Fetch the current user, which carries the session token.
    pub fn get_token(&self) -> PendingCall {
        self.call(names::GET_USER, None)
    }

    pub fn go_back(&self) -> PendingCall {
        self.call(names::GO_BACK, None)
    }

    /// Close the web view and return to the host's home screen.
    pub fn close_web(&self) -> PendingCall {
        self.call(names::CLOSE_WEB, None)
    }

    /// Show or hide the host's navigation bar.
    pub fn top_view_status(&self, status: TopViewStatus) -> PendingCall {
        self.call(
            names::TOP_VIEW_STATUS,
            Some(Value::from(status.as_str())),
        )
    }
}
