use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Backend address used when the client runs next to a local dev server
pub const DIRECT_BACKEND_URL: &str = "http://127.0.0.1:8000";

pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_EMPLOYEE_PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api_base: String,
    pub search_debounce_ms: u64,
    pub employee_page_limit: u32,
    pub request_timeout_secs: Option<u64>,
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

/// Where the client is being served from (hostname and port, as a page sees them)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingContext {
    pub hostname: String,
    pub port: String,
}

impl HostingContext {
    pub fn new(hostname: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: port.into(),
        }
    }

    /// Local dev servers talk to the backend directly; anything else goes
    /// through the reverse proxy with relative paths.
    pub fn api_base(&self) -> String {
        let is_local = self.hostname == "localhost" || self.hostname == "127.0.0.1";
        let is_dev_port = !self.port.is_empty() && self.port != "80" && self.port != "443";

        if is_local && is_dev_port {
            DIRECT_BACKEND_URL.to_string()
        } else {
            String::new()
        }
    }

    fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::new("localhost", "5173"),
            Environment::Production => Self::new("app", "80"),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply `ASSET_DESK_*` settings looked up through `var`
    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Hosting context first, an explicit base always wins
        let default_context = HostingContext::for_environment(self.environment);
        let hostname = var("ASSET_DESK_HOST");
        let port = var("ASSET_DESK_PORT");
        if hostname.is_some() || port.is_some() {
            let context = HostingContext::new(
                hostname.unwrap_or(default_context.hostname),
                port.unwrap_or_default(),
            );
            self.api_base = context.api_base();
        }
        if let Some(v) = var("ASSET_DESK_API_BASE") {
            self.api_base = v.trim_end_matches('/').to_string();
        }

        if let Some(v) = var("ASSET_DESK_SEARCH_DEBOUNCE_MS") {
            self.search_debounce_ms = v.parse().unwrap_or(self.search_debounce_ms);
        }
        if let Some(v) = var("ASSET_DESK_EMPLOYEE_LIMIT") {
            self.employee_page_limit = v.parse().unwrap_or(self.employee_page_limit);
        }
        if let Some(v) = var("ASSET_DESK_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = v.parse().ok();
        }
        if let Some(v) = var("ASSET_DESK_CONFIG_DIR") {
            self.config_dir = PathBuf::from(v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api_base: HostingContext::for_environment(Environment::Development).api_base(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            employee_page_limit: DEFAULT_EMPLOYEE_PAGE_LIMIT,
            request_timeout_secs: None,
            config_dir: default_config_dir(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api_base: HostingContext::for_environment(Environment::Production).api_base(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            employee_page_limit: DEFAULT_EMPLOYEE_PAGE_LIMIT,
            request_timeout_secs: None,
            config_dir: default_config_dir(),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Key-value file standing in for browser local storage
    pub fn storage_file(&self) -> PathBuf {
        self.config_dir.join("storage.json")
    }
}

fn default_config_dir() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".config").join("asset-desk"),
        Err(_) => PathBuf::from(".asset-desk"),
    }
}

// Global singleton config - resolved once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
