use webview_bridge::BridgeConfig;

/// The pseudo-URL the host watches for before it injects the bridge.
pub const DEFAULT_INJECTION_URL: &str = "wvjbscheme://__BRIDGE_LOADED__";

/// The user agent marker of the WeChat in-app browser, which never injects the bridge.
pub const WECHAT_USER_AGENT: &str = "MicroMessenger";

/// Configuration for the page-side bridge.
///
/// # Example
///
/// ```rust, ignore
/// webview_bridge_web::configure(
///    WebBridgeConfig::new().with_unsupported_user_agent(WECHAT_USER_AGENT),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct WebBridgeConfig {
    pub(crate) bridge: BridgeConfig,
    pub(crate) injection_url: String,
    pub(crate) unsupported_user_agents: Vec<String>,
}

impl Default for WebBridgeConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            injection_url: DEFAULT_INJECTION_URL.to_string(),
            unsupported_user_agents: Vec::new(),
        }
    }
}

impl WebBridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polling behavior of the readiness probe.
    pub fn with_bridge_config(mut self, config: BridgeConfig) -> Self {
        self.bridge = config;
        self
    }

    /// Set the URL the hidden frame navigates to when asking the host for the bridge.
    pub fn with_injection_url(mut self, url: impl Into<String>) -> Self {
        self.injection_url = url.into();
        self
    }

    /// Treat pages whose user agent contains `marker` (case insensitive) as never getting the bridge.
    ///
    /// The readiness probe rejects right away in such hosts instead of polling.
    pub fn with_unsupported_user_agent(mut self, marker: impl Into<String>) -> Self {
        self.unsupported_user_agents.push(marker.into());
        self
    }

    pub fn bridge_config(&self) -> &BridgeConfig {
        &self.bridge
    }

    pub fn injection_url(&self) -> &str {
        &self.injection_url
    }

    /// Whether `user_agent` belongs to a host that never injects the bridge.
    pub fn is_unsupported_user_agent(&self, user_agent: &str) -> bool {
        let user_agent = user_agent.to_lowercase();
        self.unsupported_user_agents
            .iter()
            .any(|marker| user_agent.contains(&marker.to_lowercase()))
    }
}
