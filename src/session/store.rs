//! The live status value for one session: one writer, many readers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::onboarding::OnboardingStatus;

/// What is currently known about the actor's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "status", rename_all = "snake_case")]
pub enum StatusSnapshot<S> {
    /// The first fetch has not resolved yet.
    Loading,
    /// No session, or the lookup failed.
    Unauthenticated,
    Known(S),
}

impl<S: OnboardingStatus> StatusSnapshot<S> {
    /// The status as the router sees it; `None` while loading or signed out.
    pub fn status(&self) -> Option<S> {
        match self {
            Self::Known(s) => Some(*s),
            Self::Loading | Self::Unauthenticated => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl<S: OnboardingStatus> From<Option<S>> for StatusSnapshot<S> {
    fn from(status: Option<S>) -> Self {
        status.map_or(Self::Unauthenticated, Self::Known)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry<S> {
    snapshot: StatusSnapshot<S>,
    updated_at: DateTime<Utc>,
}

/// Owner of the live status value.
///
/// Not `Clone`: whoever holds the store is the only writer. Everyone else
/// gets a [`StatusReader`].
pub struct StatusStore<S> {
    tx: watch::Sender<Entry<S>>,
}

impl<S: OnboardingStatus> StatusStore<S> {
    /// A store that starts out loading.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Entry {
            snapshot: StatusSnapshot::Loading,
            updated_at: Utc::now(),
        });
        Self { tx }
    }

    /// Publish a new value. Readers are only woken if it differs.
    pub fn publish(&self, snapshot: StatusSnapshot<S>) {
        self.tx.send_if_modified(|entry| {
            if entry.snapshot == snapshot {
                return false;
            }
            tracing::debug!(
                portal = S::PORTAL,
                from = ?entry.snapshot,
                to = ?snapshot,
                "Onboarding status changed"
            );
            *entry = Entry {
                snapshot,
                updated_at: Utc::now(),
            };
            true
        });
    }

    pub fn current(&self) -> StatusSnapshot<S> {
        self.tx.borrow().snapshot
    }

    pub fn reader(&self) -> StatusReader<S> {
        StatusReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl<S: OnboardingStatus> Default for StatusStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read handle on a [`StatusStore`].
#[derive(Clone)]
pub struct StatusReader<S> {
    rx: watch::Receiver<Entry<S>>,
}

impl<S: OnboardingStatus> StatusReader<S> {
    pub fn current(&self) -> StatusSnapshot<S> {
        self.rx.borrow().snapshot
    }

    /// When the current value was published.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.rx.borrow().updated_at
    }

    /// Wait until the first fetch has resolved.
    ///
    /// Returns `Unauthenticated` if the store is dropped while still loading.
    pub async fn ready(&mut self) -> StatusSnapshot<S> {
        match self.rx.wait_for(|entry| !entry.snapshot.is_loading()).await {
            Ok(entry) => entry.snapshot,
            Err(_) => StatusSnapshot::Unauthenticated,
        }
    }

    /// Wait for the next published change.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<StatusSnapshot<S>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().snapshot)
    }
}
