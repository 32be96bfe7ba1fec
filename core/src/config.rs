//! Runtime configuration for the ad-generation core.

/// Production ad-generation service.
pub const DEFAULT_BASE_URL: &str = "https://adverseco-1575cc875608.herokuapp.com";

/// Key under which the current record is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "adData";

/// Environment variable overriding the service base URL.
pub const BASE_URL_ENV: &str = "ADGEN_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdConfig {
    pub base_url: String,
    pub storage_key: String,
}

impl Default for AdConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl AdConfig {
    /// Defaults, with the base URL taken from `ADGEN_BASE_URL` when set and
    /// non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config.base_url = url;
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
