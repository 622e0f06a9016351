//! HTTP surface of the gate: onboarding API plus the gated portal pages.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{GateConfig, PortalKind};
use crate::error::Result;
use crate::guard::{GateState, onboarding_gate};
use crate::onboarding::{OnboardingStatus, delivery, restaurant};
use crate::routing::{RoutingPolicy, path};
use crate::session::{HttpStatusProvider, StatusProvider};

/// Serve the gate for the configured portal until the process exits.
///
/// Builds the HTTP status provider and the portal's bundled policy, then
/// binds the configured port.
pub async fn run(config: &GateConfig) -> Result<()> {
    let provider: Arc<dyn StatusProvider> = Arc::new(HttpStatusProvider::new(
        &config.status_url,
        config.status_timeout,
    )?);

    match config.portal {
        PortalKind::Delivery => serve(config, delivery::policy()?, provider).await,
        PortalKind::Restaurant => serve(config, restaurant::policy()?, provider).await,
    }
}

async fn serve<S: OnboardingStatus>(
    config: &GateConfig,
    policy: RoutingPolicy<S>,
    provider: Arc<dyn StatusProvider>,
) -> Result<()> {
    let state = GateState {
        policy: Arc::new(policy),
        provider,
        session_cookie: config.session_cookie.clone(),
        status_timeout: config.status_timeout,
    };
    let app = gate_routes(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, portal = S::PORTAL, "Portal gate started");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the gate router.
///
/// `/health` and `/api/onboarding/*` are always reachable; every other path
/// is served from `static_dir` behind [`onboarding_gate`].
pub fn gate_routes<S: OnboardingStatus>(state: GateState<S>, static_dir: impl AsRef<Path>) -> Router {
    let api = Router::new()
        .route("/health", get(health::<S>))
        .route("/api/onboarding/routes", get(route_info::<S>))
        .route("/api/onboarding/resolve", post(resolve::<S>))
        .route("/api/onboarding/session", get(session::<S>))
        .with_state(state.clone());

    let pages = Router::new()
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(from_fn_with_state(state, onboarding_gate::<S>));

    api.merge(pages).layer(TraceLayer::new_for_http())
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health<S: OnboardingStatus>() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "portal-gate",
        "portal": S::PORTAL,
    }))
}

// ── Onboarding API ──────────────────────────────────────────────────────

/// GET /api/onboarding/routes
///
/// The portal's status vocabulary, canonical routes and classification table.
async fn route_info<S: OnboardingStatus>(State(state): State<GateState<S>>) -> impl IntoResponse {
    let policy = &state.policy;
    let statuses: Vec<serde_json::Value> = S::ALL
        .iter()
        .map(|&s| {
            serde_json::json!({
                "status": s,
                "label": s.label(),
                "route": policy.canonical_route(s),
                "terminal": s.is_terminal(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "portal": S::PORTAL,
        "login_path": policy.login_path(),
        "dashboard_root": policy.dashboard_root(),
        "terminal_status": policy.terminal_status(),
        "statuses": statuses,
        "table": policy.table(),
    }))
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    #[serde(default)]
    status: Option<String>,
    path: String,
}

/// POST /api/onboarding/resolve
///
/// Evaluate the policy for an explicit `(status, path)`. A status outside
/// the vocabulary is resolved as signed out.
async fn resolve<S: OnboardingStatus>(
    State(state): State<GateState<S>>,
    Json(req): Json<ResolveRequest>,
) -> impl IntoResponse {
    if let Err(e) = path::validate(&req.path) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    let status = match req.status.as_deref() {
        None => None,
        Some(raw) => match S::parse(raw) {
            Ok(status) => Some(status),
            Err(e) => {
                error!(portal = S::PORTAL, error = %e, "Resolve called with unknown status");
                None
            }
        },
    };

    let redirect = state.policy.resolve_redirect(status, &req.path);
    Json(serde_json::json!({ "redirect": redirect })).into_response()
}

/// GET /api/onboarding/session
///
/// The calling session's status as the gate sees it.
async fn session<S: OnboardingStatus>(
    State(state): State<GateState<S>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let status = state.session_status(&headers).await;
    Json(serde_json::json!({
        "authenticated": status.is_some(),
        "status": status,
        "label": status.map(|s| s.label()),
        "canonical_route": status.map(|s| state.policy.canonical_route(s)),
    }))
}
