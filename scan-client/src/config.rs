//! Engine configuration

/// Configuration for the scan engine's backend connections
///
/// The directory API also hosts the Provider A (Apple-style) mutation
/// endpoints; Provider B (PWA-style) lives on its own base URL.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory + Provider A base URL (e.g., "https://api.example.com")
    pub api_base_url: String,

    /// Provider B (PWA wallet) base URL
    pub wallet_base_url: String,

    /// Bearer token of the authenticated console session
    pub token: Option<String>,

    /// Per-request timeout in seconds
    ///
    /// Bounds each provider attempt so a hung primary call cannot delay
    /// fallback indefinitely.
    pub timeout: u64,
}

impl ScanConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Create a new configuration with default timeout and no token
    pub fn new(api_base_url: impl Into<String>, wallet_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            wallet_base_url: wallet_base_url.into(),
            token: None,
            timeout: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout in seconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let cfg = ScanConfig::new("https://api.test", "https://wallet.test");
        assert_eq!(cfg.timeout, ScanConfig::DEFAULT_TIMEOUT_SECS);
        assert!(cfg.token.is_none());
    }

    #[test]
    fn test_config_builder_methods() {
        let cfg = ScanConfig::new("a", "b").with_token("t0k3n").with_timeout(5);
        assert_eq!(cfg.token.as_deref(), Some("t0k3n"));
        assert_eq!(cfg.timeout, 5);
    }
}
