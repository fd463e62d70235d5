use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Language used for display strings (month names, range labels, status labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayLocale {
    #[default]
    Danish,
    English,
}

impl DisplayLocale {
    #[must_use]
    pub fn chrono_locale(self) -> chrono::Locale {
        match self {
            DisplayLocale::Danish => chrono::Locale::da_DK,
            DisplayLocale::English => chrono::Locale::en_US,
        }
    }
}

impl std::fmt::Display for DisplayLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayLocale::Danish => write!(f, "da"),
            DisplayLocale::English => write!(f, "en"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the hosted backend (REST, rpc and functions live under it).
    pub hosted_url: Option<String>,
    pub hosted_anon_key: Option<String>,
    /// Endpoint the scheduled relay forwards to.
    pub sync_endpoint: Option<String>,
    pub sync_bearer: Option<String>,
    /// `None` when the scheduled relay job is disabled.
    pub sync_cron: Option<String>,
    pub http_timeout_secs: u64,
    pub locale: DisplayLocale,
}

impl AppConfig {
    /// Names of credential variables that are unset.
    ///
    /// Missing credentials are not fatal: binaries log each entry as a warning
    /// and keep running with degraded hosted access.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.hosted_url.is_none() {
            missing.push("MAGDASH_HOSTED_URL");
        }
        if self.hosted_anon_key.is_none() {
            missing.push("MAGDASH_HOSTED_ANON_KEY");
        }
        if self.sync_bearer.is_none() {
            missing.push("MAGDASH_SYNC_BEARER");
        }
        missing
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("hosted_url", &self.hosted_url)
            .field(
                "hosted_anon_key",
                &self.hosted_anon_key.as_ref().map(|_| "[redacted]"),
            )
            .field("sync_endpoint", &self.sync_endpoint)
            .field(
                "sync_bearer",
                &self.sync_bearer.as_ref().map(|_| "[redacted]"),
            )
            .field("sync_cron", &self.sync_cron)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("locale", &self.locale)
            .finish()
    }
}
