//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Which partner portal the gate fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalKind {
    Delivery,
    Restaurant,
}

impl std::str::FromStr for PortalKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delivery" => Ok(Self::Delivery),
            "restaurant" => Ok(Self::Restaurant),
            other => Err(ConfigError::InvalidValue {
                key: "PORTAL_KIND".to_string(),
                message: format!("expected 'delivery' or 'restaurant', got '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for PortalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivery => write!(f, "delivery"),
            Self::Restaurant => write!(f, "restaurant"),
        }
    }
}

/// Gate server configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub portal: PortalKind,
    /// Backend endpoint reporting the signed-in actor's onboarding status.
    pub status_url: String,
    pub port: u16,
    /// Upper bound on a single status lookup before the actor is treated as signed out.
    pub status_timeout: Duration,
    pub session_cookie: String,
    /// Directory holding the portal's exported pages.
    pub static_dir: PathBuf,
}

impl GateConfig {
    /// Load from `PORTAL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok())?)
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<Self, ConfigError> {
        let portal: PortalKind = lookup("PORTAL_KIND")
            .ok_or_else(|| ConfigError::MissingEnvVar("PORTAL_KIND".to_string()))?
            .parse()?;

        let status_url = lookup("PORTAL_STATUS_URL").ok_or_else(|| ConfigError::MissingRequired {
            key: "PORTAL_STATUS_URL".to_string(),
            hint: "Point it at the backend endpoint returning {\"status\": ...} for a session"
                .to_string(),
        })?;
        if !(status_url.starts_with("http://") || status_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "PORTAL_STATUS_URL".to_string(),
                message: format!("expected an http(s) URL, got '{status_url}'"),
            });
        }

        let port = parse_or(&lookup, "PORTAL_PORT", 3100u16)?;
        let timeout_ms = parse_or(&lookup, "PORTAL_STATUS_TIMEOUT_MS", 5000u64)?;
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PORTAL_STATUS_TIMEOUT_MS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let session_cookie = lookup("PORTAL_SESSION_COOKIE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "session".to_string());

        let static_dir = lookup("PORTAL_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./public"));

        Ok(Self {
            portal,
            status_url,
            port,
            status_timeout: Duration::from_millis(timeout_ms),
            session_cookie,
            static_dir,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> std::result::Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{e}"),
        }),
    }
}
