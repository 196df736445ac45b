//! Configuration system (layered: code > env > config file > defaults).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::LinkError;

const DEFAULT_API_ROOT: &str = "http://localhost:8080/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_HEADER: &str = "X-Session-Token";
const DEFAULT_COOKIE_NAME: &str = "sessionToken";

/// Connection settings for the host platform.
///
/// Resolution order:
/// 1. Values set in code through the `with_*` builders
/// 2. Environment variables (`EXTLINK_*`, `.env` honored)
/// 3. A TOML config file, when loaded with [`PlatformConfig::load_from_path`]
/// 4. Built-in defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    api_root: String,
    timeout: Duration,
    token_header: String,
    cookie_name: String,
    cookie_path: Option<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_path: None,
        }
    }
}

impl PlatformConfig {
    pub fn new(api_root: impl Into<String>) -> Self {
        Self::default().with_api_root(api_root)
    }

    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_env_overrides()
    }

    /// Load a TOML config file, then overlay environment variables.
    ///
    /// A missing file yields the defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, LinkError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default().with_env_overrides())
            }
            Err(err) => return Err(LinkError::Io(err)),
        };
        let file: ConfigFile = toml::from_str(&raw).map_err(|e| {
            LinkError::Configuration(format!("Invalid config file {}: {e}", path.display()))
        })?;
        Ok(Self::default().merge_file(file).with_env_overrides())
    }

    fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(api_root) = file.api_root {
            self = self.with_api_root(api_root);
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(header) = file.token_header {
            self.token_header = header;
        }
        if let Some(name) = file.cookie_name {
            self.cookie_name = name;
        }
        if file.cookie_path.is_some() {
            self.cookie_path = file.cookie_path;
        }
        self
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var("EXTLINK_API_ROOT") {
            self = self.with_api_root(root);
        }
        if let Some(secs) = std::env::var("EXTLINK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.timeout = Duration::from_secs(secs);
        }
        if let Ok(header) = std::env::var("EXTLINK_TOKEN_HEADER") {
            self.token_header = header;
        }
        if let Ok(name) = std::env::var("EXTLINK_COOKIE_NAME") {
            self.cookie_name = name;
        }
        if let Ok(path) = std::env::var("EXTLINK_COOKIE_PATH") {
            self.cookie_path = Some(PathBuf::from(path));
        }
        self
    }

    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token_header(mut self, header: impl Into<String>) -> Self {
        self.token_header = header.into();
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_path = Some(path.into());
        self
    }

    /// API root without a trailing slash.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn token_header(&self) -> &str {
        &self.token_header
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Location of the persisted session cookie file.
    pub fn cookie_path(&self) -> PathBuf {
        self.cookie_path
            .clone()
            .unwrap_or_else(crate::session::default_cookie_path)
    }

    /// Join a relative path onto the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    /// Build the HTTP client used by the platform services.
    ///
    /// Request timeouts live here; the services never retry. Fails when the
    /// token header name could never be sent.
    pub fn http_client(&self) -> Result<reqwest::Client, LinkError> {
        crate::http::validate_header_name(&self.token_header)?;
        reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| LinkError::Configuration(format!("Failed to build HTTP client: {e}")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_root: Option<String>,
    timeout_secs: Option<u64>,
    token_header: Option<String>,
    cookie_name: Option<String>,
    cookie_path: Option<PathBuf>,
}
