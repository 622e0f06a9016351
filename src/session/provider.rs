//! Status providers: where an actor's onboarding status comes from.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::StatusError;

/// An opaque session credential issued by the auth SDK.
#[derive(Debug, Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// A raw status value as reported by the backend, not yet checked against
/// any portal's vocabulary.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub status: String,
    pub observed_at: DateTime<Utc>,
}

impl StatusReport {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            observed_at: Utc::now(),
        }
    }
}

/// Source of truth for onboarding status.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Look up the status for a session.
    ///
    /// Returns [`StatusError::Unauthenticated`] when the session is not valid.
    async fn fetch_status(&self, session: &SessionToken) -> Result<StatusReport, StatusError>;
}

// ── HTTP ────────────────────────────────────────────────────────────────

/// Status payload returned by the backend's profile endpoint.
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(alias = "onboardingStatus")]
    status: String,
}

/// Fetches status from the REST backend with a bearer token.
pub struct HttpStatusProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, StatusError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl StatusProvider for HttpStatusProvider {
    async fn fetch_status(&self, session: &SessionToken) -> Result<StatusReport, StatusError> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(session.expose())
            .send()
            .await?;

        let code = response.status();
        if code == StatusCode::UNAUTHORIZED || code == StatusCode::FORBIDDEN {
            debug!(status = %code, "Backend rejected session");
            return Err(StatusError::Unauthenticated);
        }
        if !code.is_success() {
            warn!(status = %code, url = %self.url, "Status endpoint returned an error");
            return Err(StatusError::RequestFailed {
                reason: format!("backend responded {code}"),
            });
        }

        let body: StatusBody = response.json().await?;
        Ok(StatusReport::new(body.status))
    }
}

// ── In-memory ───────────────────────────────────────────────────────────

/// Token → status map held in memory.
///
/// Useful for local development and tests; `set` plays the part of the
/// backend advancing an actor after an onboarding submission.
#[derive(Default)]
pub struct InMemoryStatusProvider {
    sessions: RwLock<HashMap<String, String>>,
    delay: Option<Duration>,
}

impl InMemoryStatusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup, to simulate a slow backend.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn set(&self, token: impl Into<String>, status: impl Into<String>) {
        self.sessions
            .write()
            .await
            .insert(token.into(), status.into());
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }
}

#[async_trait]
impl StatusProvider for InMemoryStatusProvider {
    async fn fetch_status(&self, session: &SessionToken) -> Result<StatusReport, StatusError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sessions
            .read()
            .await
            .get(session.expose())
            .map(StatusReport::new)
            .ok_or(StatusError::Unauthenticated)
    }
}
