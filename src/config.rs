// ⚙️ Server configuration, read from the environment

use std::env;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8080";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 10;
pub const DEFAULT_STATIC_DIR: &str = "web";

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the web server listens on (PNL_BIND_ADDR)
    pub bind_addr: String,

    /// Base URL of the analysis service (PNL_UPSTREAM_URL)
    pub upstream_url: String,

    /// Upload size limit in megabytes (PNL_MAX_UPLOAD_MB)
    pub max_upload_mb: usize,

    /// Directory served under /static (PNL_STATIC_DIR)
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            static_dir: DEFAULT_STATIC_DIR.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        // The limit must also fit in bytes
        let max_upload_mb = match lookup("PNL_MAX_UPLOAD_MB") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|mb| mb.checked_mul(BYTES_PER_MB).is_some())
                .unwrap_or_else(|| {
                    warn!(value = %raw, "ignoring invalid PNL_MAX_UPLOAD_MB");
                    defaults.max_upload_mb
                }),
            None => defaults.max_upload_mb,
        };

        ServerConfig {
            bind_addr: lookup("PNL_BIND_ADDR").unwrap_or(defaults.bind_addr),
            upstream_url: lookup("PNL_UPSTREAM_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream_url),
            max_upload_mb,
            static_dir: lookup("PNL_STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }
}
