use std::time::Duration;

/// Configuration for a [`BridgeGate`](crate::BridgeGate).
///
/// # Example
///
/// ```rust, ignore
/// let gate = BridgeGate::with_config(env, BridgeConfig::new().with_max_attempts(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub(crate) poll_interval: Duration,
    pub(crate) max_attempts: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            max_attempts: 100,
        }
    }
}

impl BridgeConfig {
    /// The default configuration: poll every 50ms, give up after 100 polls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long the readiness probe waits between two checks of the flag.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set how many times the readiness probe checks the flag before giving up.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The longest the readiness probe will wait.
    pub fn poll_budget(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}
