// =============================================================================
// CYBERSHIELD CORE — config.rs
// Environment-driven settings
// =============================================================================
//
//   SHIELD_SERVICE_URL   base URL of the classifier service
//   SHIELD_TIMEOUT_SECS  per-request timeout
//   SHIELD_API_ADDR      bind address of the read-only snapshot API
//
// A bad value is logged and replaced by its default; nothing here is fatal.
// =============================================================================

use std::net::SocketAddr;
use std::time::Duration;

use crate::constants::{DEFAULT_API_ADDR, DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{ShieldError, ShieldResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ShieldConfig {
    pub service_url: String,
    pub timeout: Duration,
    pub api_addr: SocketAddr,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        ShieldConfig {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_addr: default_api_addr(),
        }
    }
}

fn default_api_addr() -> SocketAddr {
    DEFAULT_API_ADDR
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8088)))
}

impl ShieldConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = ShieldConfig::default();

        if let Some(raw) = lookup("SHIELD_SERVICE_URL") {
            match normalize_service_url(&raw) {
                Ok(url) => cfg.service_url = url,
                Err(e) => log::warn!("SHIELD_SERVICE_URL ignored: {}", e),
            }
        }

        if let Some(raw) = lookup("SHIELD_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => cfg.timeout = Duration::from_secs(secs),
                _ => log::warn!("SHIELD_TIMEOUT_SECS ignored (need a positive integer): {}", raw),
            }
        }

        if let Some(raw) = lookup("SHIELD_API_ADDR") {
            match raw.trim().parse::<SocketAddr>() {
                Ok(addr) => cfg.api_addr = addr,
                Err(_) => log::warn!("SHIELD_API_ADDR ignored (need host:port): {}", raw),
            }
        }

        cfg
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme.
pub fn normalize_service_url(raw: &str) -> ShieldResult<String> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ShieldError::Config("service url is empty".into()));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ShieldError::Config(format!("service url needs http:// or https://: {}", url)));
    }
    Ok(url.to_string())
}
