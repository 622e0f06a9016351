//! Session status: fetching an actor's onboarding status and keeping the
//! live value for the guard.

pub mod provider;
pub mod store;

pub use provider::{
    HttpStatusProvider, InMemoryStatusProvider, SessionToken, StatusProvider, StatusReport,
};
pub use store::{StatusReader, StatusSnapshot, StatusStore};

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::StatusError;
use crate::onboarding::OnboardingStatus;

/// Fetch and parse an actor's status, folding every failure into `None`.
///
/// Timeouts, transport errors, rejected sessions and unknown status values
/// all mean "not authenticated" to the router. Nothing is retried here.
pub async fn resolve_status<S: OnboardingStatus>(
    provider: &dyn StatusProvider,
    session: Option<&SessionToken>,
    timeout: Duration,
) -> Option<S> {
    let session = session?;

    let report = match tokio::time::timeout(timeout, provider.fetch_status(session)).await {
        Ok(Ok(report)) => report,
        Ok(Err(StatusError::Unauthenticated)) => {
            debug!(portal = S::PORTAL, "Session not authenticated");
            return None;
        }
        Ok(Err(e)) => {
            warn!(portal = S::PORTAL, error = %e, "Status fetch failed, treating as signed out");
            return None;
        }
        Err(_) => {
            warn!(
                portal = S::PORTAL,
                error = %StatusError::Timeout(timeout),
                "Status fetch failed, treating as signed out"
            );
            return None;
        }
    };

    match S::parse(&report.status) {
        Ok(status) => {
            debug!(
                portal = S::PORTAL,
                status = %status,
                observed_at = %report.observed_at,
                "Resolved onboarding status"
            );
            Some(status)
        }
        Err(e) => {
            error!(portal = S::PORTAL, error = %e, "Backend reported a status outside the vocabulary");
            None
        }
    }
}

/// The single writer of a session's [`StatusStore`].
///
/// Call [`refresh`](Self::refresh) on mount and after every onboarding
/// submission the backend may have advanced.
pub struct StatusSync<S: OnboardingStatus> {
    store: StatusStore<S>,
    provider: Arc<dyn StatusProvider>,
    session: Option<SessionToken>,
    timeout: Duration,
}

impl<S: OnboardingStatus> StatusSync<S> {
    pub fn new(
        provider: Arc<dyn StatusProvider>,
        session: Option<SessionToken>,
        timeout: Duration,
    ) -> Self {
        Self {
            store: StatusStore::new(),
            provider,
            session,
            timeout,
        }
    }

    pub fn reader(&self) -> StatusReader<S> {
        self.store.reader()
    }

    pub fn current(&self) -> StatusSnapshot<S> {
        self.store.current()
    }

    /// Fetch the status again and publish it.
    pub async fn refresh(&self) -> StatusSnapshot<S> {
        let status =
            resolve_status::<S>(self.provider.as_ref(), self.session.as_ref(), self.timeout).await;
        let snapshot = StatusSnapshot::from(status);
        self.store.publish(snapshot);
        snapshot
    }

    /// Start the first fetch in the background.
    ///
    /// Dropping the returned [`Mount`] aborts a fetch still in flight.
    pub fn mount(self: &Arc<Self>) -> Mount {
        let sync = Arc::clone(self);
        let handle = tokio::spawn(async move {
            sync.refresh().await;
        });
        Mount {
            fetch: Some(handle),
        }
    }
}

/// A mounted session. Owns the in-flight status fetch.
pub struct Mount {
    fetch: Option<JoinHandle<()>>,
}

impl Mount {
    /// Whether the first fetch is still running.
    pub fn is_fetching(&self) -> bool {
        self.fetch.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        if let Some(handle) = self.fetch.take() {
            if !handle.is_finished() {
                debug!("Unmounting session, aborting status fetch");
            }
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::{DeliveryStatus, RestaurantStatus};

    struct FailingProvider;

    #[async_trait::async_trait]
    impl StatusProvider for FailingProvider {
        async fn fetch_status(&self, _session: &SessionToken) -> Result<StatusReport, StatusError> {
            Err(StatusError::RequestFailed {
                reason: "connection refused".to_string(),
            })
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn resolves_known_status() {
        let provider = InMemoryStatusProvider::new();
        provider.set("t", "PENDING_BANK_DETAILS").await;
        let token = SessionToken::new("t");

        let status = resolve_status::<RestaurantStatus>(&provider, Some(&token), TIMEOUT).await;
        assert_eq!(status, Some(RestaurantStatus::PendingBankDetails));
    }

    #[tokio::test]
    async fn missing_session_is_signed_out() {
        let provider = InMemoryStatusProvider::new();
        let status = resolve_status::<DeliveryStatus>(&provider, None, TIMEOUT).await;
        assert_eq!(status, None);
    }

    #[tokio::test]
    async fn unknown_status_fails_closed() {
        let provider = InMemoryStatusProvider::new();
        provider.set("t", "SUPER_APPROVED").await;
        let token = SessionToken::new("t");

        let status = resolve_status::<DeliveryStatus>(&provider, Some(&token), TIMEOUT).await;
        assert_eq!(status, None);
    }

    #[tokio::test]
    async fn wrong_portal_vocabulary_fails_closed() {
        let provider = InMemoryStatusProvider::new();
        provider.set("t", "PENDING_REVIEW").await;
        let token = SessionToken::new("t");

        let status = resolve_status::<DeliveryStatus>(&provider, Some(&token), TIMEOUT).await;
        assert_eq!(status, None);
    }

    #[tokio::test]
    async fn provider_error_fails_closed() {
        let token = SessionToken::new("t");
        let status = resolve_status::<DeliveryStatus>(&FailingProvider, Some(&token), TIMEOUT).await;
        assert_eq!(status, None);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = InMemoryStatusProvider::new().with_delay(Duration::from_secs(10));
        provider.set("t", "APPROVED").await;
        let token = SessionToken::new("t");

        let status = resolve_status::<DeliveryStatus>(&provider, Some(&token), TIMEOUT).await;
        assert_eq!(status, None);
    }

    #[tokio::test]
    async fn refresh_publishes_backend_progress() {
        let provider = Arc::new(InMemoryStatusProvider::new());
        provider.set("t", "NOT_STARTED").await;
        let sync = StatusSync::<DeliveryStatus>::new(
            provider.clone(),
            Some(SessionToken::new("t")),
            TIMEOUT,
        );
        let reader = sync.reader();
        assert!(reader.current().is_loading());

        sync.refresh().await;
        assert_eq!(reader.current().status(), Some(DeliveryStatus::NotStarted));

        provider.set("t", "PENDING").await;
        sync.refresh().await;
        assert_eq!(reader.current().status(), Some(DeliveryStatus::Pending));

        provider.revoke("t").await;
        assert_eq!(sync.refresh().await, StatusSnapshot::Unauthenticated);
    }

    #[tokio::test]
    async fn mount_resolves_first_load() {
        let provider = Arc::new(InMemoryStatusProvider::new());
        provider.set("t", "APPROVED").await;
        let sync = Arc::new(StatusSync::<DeliveryStatus>::new(
            provider,
            Some(SessionToken::new("t")),
            TIMEOUT,
        ));

        let mut reader = sync.reader();
        let _mount = sync.mount();
        assert_eq!(
            reader.ready().await,
            StatusSnapshot::Known(DeliveryStatus::Approved)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_aborts_inflight_fetch() {
        let provider =
            Arc::new(InMemoryStatusProvider::new().with_delay(Duration::from_secs(1)));
        provider.set("t", "APPROVED").await;
        let sync = Arc::new(StatusSync::<DeliveryStatus>::new(
            provider,
            Some(SessionToken::new("t")),
            Duration::from_secs(5),
        ));

        let mount = sync.mount();
        tokio::task::yield_now().await;
        assert!(mount.is_fetching());
        drop(mount);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(sync.current().is_loading(), "aborted fetch must not publish");
    }
}
