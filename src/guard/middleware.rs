//! Axum middleware that gates a portal's pages on onboarding status.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, info};

use crate::onboarding::OnboardingStatus;
use crate::routing::{Decision, RoutingPolicy};
use crate::session::{SessionToken, StatusProvider, resolve_status};

/// Shared state for the gate and the onboarding API.
pub struct GateState<S: OnboardingStatus> {
    pub policy: Arc<RoutingPolicy<S>>,
    pub provider: Arc<dyn StatusProvider>,
    /// Name of the cookie carrying the session token.
    pub session_cookie: String,
    pub status_timeout: Duration,
}

impl<S: OnboardingStatus> Clone for GateState<S> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
            provider: Arc::clone(&self.provider),
            session_cookie: self.session_cookie.clone(),
            status_timeout: self.status_timeout,
        }
    }
}

impl<S: OnboardingStatus> GateState<S> {
    /// Resolve the status of the session a request carries.
    pub async fn session_status(&self, headers: &HeaderMap) -> Option<S> {
        let session = session_token(headers, &self.session_cookie);
        resolve_status::<S>(self.provider.as_ref(), session.as_ref(), self.status_timeout).await
    }
}

/// Pull the session token from the named cookie, falling back to a bearer
/// `Authorization` header.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.trim(), unquote(value.trim())))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value);

    let from_bearer = || {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    };

    from_cookie.or_else(from_bearer).map(SessionToken::new)
}

/// Cookie values may be wrapped in double quotes (RFC 6265 `cookie-value`).
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Redirect the request if the actor does not belong on this path.
///
/// Redirects use `303 See Other`, so the browser replaces the location
/// with a plain GET of the target. Failures to look up the status are
/// treated as signed out and never show up in the redirect URL.
pub async fn onboarding_gate<S: OnboardingStatus>(
    State(state): State<GateState<S>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let session = session_token(request.headers(), &state.session_cookie);
    let status =
        resolve_status::<S>(state.provider.as_ref(), session.as_ref(), state.status_timeout).await;

    match state.policy.decide(status, &path) {
        Decision::Allow => {
            debug!(portal = S::PORTAL, path = %path, status = ?status, "Gate allowed request");
            next.run(request).await
        }
        Decision::Redirect { to, reason } => {
            info!(
                portal = S::PORTAL,
                path = %path,
                status = ?status,
                to = %to,
                reason = %reason,
                "Gate redirected request"
            );
            Redirect::to(to).into_response()
        }
    }
}
