//! Guards: apply routing decisions.
//!
//! [`OnboardingGuard`] is the session-scoped guard a portal shell consults
//! on every render. [`middleware`] applies the same policy to HTTP requests
//! in front of a portal's exported pages.

pub mod middleware;

pub use middleware::{GateState, onboarding_gate};

use std::sync::Arc;

use tracing::info;

use crate::onboarding::OnboardingStatus;
use crate::routing::RoutingPolicy;
use crate::session::{StatusReader, StatusSnapshot};

/// Replaces the current location without adding a history entry.
pub trait Navigator: Send + Sync {
    fn replace(&self, path: &str);
}

/// What the shell should show for the current path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Status still loading; show a placeholder rather than the page.
    Loading,
    /// Render the requested page.
    Render,
    /// A redirect to this path is in progress.
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AppliedRedirect<S> {
    snapshot: StatusSnapshot<S>,
    from: String,
    to: String,
}

/// Consults the policy against the live status and navigates at most once
/// per decision.
pub struct OnboardingGuard<S: OnboardingStatus, N: Navigator> {
    policy: Arc<RoutingPolicy<S>>,
    status: StatusReader<S>,
    navigator: N,
    applied: Option<AppliedRedirect<S>>,
}

impl<S: OnboardingStatus, N: Navigator> OnboardingGuard<S, N> {
    pub fn new(policy: Arc<RoutingPolicy<S>>, status: StatusReader<S>, navigator: N) -> Self {
        Self {
            policy,
            status,
            navigator,
            applied: None,
        }
    }

    /// Evaluate the current path against the latest status.
    ///
    /// Re-evaluating the same `(status, path)` while a redirect is pending
    /// returns the same outcome without navigating again.
    pub fn evaluate(&mut self, path: &str) -> GuardOutcome {
        let snapshot = self.status.current();
        if snapshot.is_loading() {
            return GuardOutcome::Loading;
        }

        let decision = self.policy.decide(snapshot.status(), path);
        let Some(target) = decision.target() else {
            self.applied = None;
            return GuardOutcome::Render;
        };

        let pending = AppliedRedirect {
            snapshot,
            from: path.to_string(),
            to: target.to_string(),
        };
        if self.applied.as_ref() != Some(&pending) {
            info!(
                portal = S::PORTAL,
                status = ?snapshot.status(),
                status_updated_at = %self.status.updated_at(),
                from = %path,
                to = %target,
                decision = ?decision,
                "Onboarding redirect"
            );
            self.navigator.replace(target);
            self.applied = Some(pending);
        }
        GuardOutcome::Redirect(target.to_string())
    }

    /// Wait for the first status fetch, then evaluate.
    pub async fn evaluate_when_ready(&mut self, path: &str) -> GuardOutcome {
        self.status.ready().await;
        self.evaluate(path)
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::onboarding::{DeliveryStatus, delivery};
    use crate::session::{InMemoryStatusProvider, SessionToken, StatusStore, StatusSync};

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn visits(&self) -> Vec<String> {
            self.visits.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn replace(&self, path: &str) {
            self.visits.lock().unwrap().push(path.to_string());
        }
    }

    fn guard(
        store: &StatusStore<DeliveryStatus>,
    ) -> OnboardingGuard<DeliveryStatus, RecordingNavigator> {
        OnboardingGuard::new(
            Arc::new(delivery::policy().unwrap()),
            store.reader(),
            RecordingNavigator::default(),
        )
    }

    #[test]
    fn loading_renders_placeholder_without_navigating() {
        let store = StatusStore::new();
        let mut g = guard(&store);
        assert_eq!(g.evaluate("/dashboard"), GuardOutcome::Loading);
        assert!(g.navigator().visits().is_empty());
    }

    #[test]
    fn repeated_renders_navigate_once() {
        let store = StatusStore::new();
        store.publish(StatusSnapshot::Known(DeliveryStatus::Pending));
        let mut g = guard(&store);

        for _ in 0..3 {
            assert_eq!(
                g.evaluate("/dashboard"),
                GuardOutcome::Redirect("/pending-review".to_string())
            );
        }
        assert_eq!(g.navigator().visits(), vec!["/pending-review"]);
    }

    #[test]
    fn landing_on_target_renders() {
        let store = StatusStore::new();
        store.publish(StatusSnapshot::Known(DeliveryStatus::Pending));
        let mut g = guard(&store);

        g.evaluate("/dashboard");
        assert_eq!(g.evaluate("/pending-review"), GuardOutcome::Render);
        assert_eq!(g.navigator().visits().len(), 1);
    }

    #[test]
    fn status_change_reevaluates_synchronously() {
        let store = StatusStore::new();
        store.publish(StatusSnapshot::Known(DeliveryStatus::NotStarted));
        let mut g = guard(&store);

        assert_eq!(g.evaluate("/documents"), GuardOutcome::Render);

        // Documents submitted; backend advanced the actor.
        store.publish(StatusSnapshot::Known(DeliveryStatus::Pending));
        assert_eq!(
            g.evaluate("/documents"),
            GuardOutcome::Redirect("/pending-review".to_string())
        );

        store.publish(StatusSnapshot::Known(DeliveryStatus::Approved));
        assert_eq!(
            g.evaluate("/pending-review"),
            GuardOutcome::Redirect("/dashboard".to_string())
        );
        assert_eq!(g.navigator().visits(), vec!["/pending-review", "/dashboard"]);
    }

    #[test]
    fn signed_out_goes_to_login() {
        let store = StatusStore::new();
        store.publish(StatusSnapshot::Unauthenticated);
        let mut g = guard(&store);
        assert_eq!(
            g.evaluate("/earnings"),
            GuardOutcome::Redirect("/login".to_string())
        );
        assert_eq!(g.evaluate("/login"), GuardOutcome::Render);
    }

    #[tokio::test]
    async fn first_load_suspends_until_fetch_resolves() {
        let provider =
            Arc::new(InMemoryStatusProvider::new().with_delay(Duration::from_millis(20)));
        provider.set("rider-7", "NOT_STARTED").await;
        let sync = Arc::new(StatusSync::<DeliveryStatus>::new(
            provider,
            Some(SessionToken::new("rider-7")),
            Duration::from_secs(1),
        ));

        let mut g = OnboardingGuard::new(
            Arc::new(delivery::policy().unwrap()),
            sync.reader(),
            RecordingNavigator::default(),
        );
        let _mount = sync.mount();

        assert_eq!(g.evaluate("/dashboard/deliveries/123"), GuardOutcome::Loading);
        assert_eq!(
            g.evaluate_when_ready("/dashboard/deliveries/123").await,
            GuardOutcome::Redirect("/documents".to_string())
        );
        assert_eq!(g.navigator().visits(), vec!["/documents"]);
    }
}
