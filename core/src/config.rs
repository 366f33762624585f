//! Client configuration.

/// Production endpoint of the booleans service.
pub const DEFAULT_API_URL: &str = "https://api.booleans.io/";

/// Environment variable that overrides the API endpoint.
pub const API_URL_ENV: &str = "BOOLEANS_API_URL";

/// Settings used to construct a `BooleansClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the API; every path is resolved against it.
    pub base_url: String,
    /// User agent sent by `ReqwestTransport`.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("booleans-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the base URL taken from `BOOLEANS_API_URL` when set.
    pub fn from_env() -> Self {
        Self::with_url_override(std::env::var(API_URL_ENV).ok().as_deref())
    }

    /// Blank overrides are ignored.
    fn with_url_override(url: Option<&str>) -> Self {
        match url.map(str::trim) {
            Some(url) if !url.is_empty() => Self::default().with_base_url(url),
            _ => Self::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_production() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert!(config.user_agent.starts_with("booleans-core/"));
    }

    #[test]
    fn url_override_replaces_default() {
        let config = ClientConfig::with_url_override(Some(" http://127.0.0.1:3000 "));
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn blank_or_missing_override_keeps_default() {
        assert_eq!(ClientConfig::with_url_override(None), ClientConfig::default());
        assert_eq!(ClientConfig::with_url_override(Some("")), ClientConfig::default());
        assert_eq!(ClientConfig::with_url_override(Some("   ")), ClientConfig::default());
    }

    // The only test in this crate that touches the process environment.
    #[test]
    fn from_env_reads_api_url_variable() {
        std::env::set_var(API_URL_ENV, "http://localhost:4000/");
        let config = ClientConfig::from_env();
        std::env::remove_var(API_URL_ENV);
        assert_eq!(config.base_url, "http://localhost:4000/");

        assert_eq!(ClientConfig::from_env(), ClientConfig::default());
    }

    #[test]
    fn with_base_url_overrides_only_the_url() {
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:3000");
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.user_agent, ClientConfig::default().user_agent);
    }
}
