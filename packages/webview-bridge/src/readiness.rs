/// Whether the native bridge is available to this page.
///
/// Starts out [`Readiness::Unknown`]. Once it reaches [`Readiness::Ready`] or [`Readiness::Unready`] it stays there
/// for the lifetime of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Readiness {
    /// The bridge has not been observed yet.
    #[default]
    Unknown,

    /// The bridge is injected and usable.
    Ready,

    /// The bridge is confirmed to be unavailable.
    Unready,
}

impl Readiness {
    /// Whether this value may no longer change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Map the tri-state global flag (`undefined`, `true`, `false`) onto a readiness.
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Unknown,
            Some(true) => Self::Ready,
            Some(false) => Self::Unready,
        }
    }

    /// The inverse of [`Readiness::from_flag`].
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Ready => Some(true),
            Self::Unready => Some(false),
        }
    }
}
