//! Delivery-partner onboarding: documents, then review, then the dashboard.

use serde::{Deserialize, Serialize};

use super::status::OnboardingStatus;
use crate::error::{PolicyError, StatusError};
use crate::routing::{RouteTable, RoutingPolicy, STATIC_ASSETS};

/// Verification progress of a delivery partner.
///
/// Progresses linearly: NotStarted → Pending → Approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    NotStarted,
    Pending,
    Approved,
}

impl OnboardingStatus for DeliveryStatus {
    const PORTAL: &'static str = "delivery";
    const ALL: &'static [Self] = &[Self::NotStarted, Self::Pending, Self::Approved];

    fn is_terminal(self) -> bool {
        matches!(self, Self::Approved)
    }

    fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::Pending => "Pending review",
            Self::Approved => "Approved",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical page for each status.
pub fn canonical_route(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::NotStarted => "/documents",
        DeliveryStatus::Pending => "/pending-review",
        DeliveryStatus::Approved => "/dashboard",
    }
}

/// Path classification for the delivery-partner portal.
pub fn route_table() -> RouteTable {
    RouteTable::new()
        .public(["/", "/login", "/verify-otp"])
        .onboarding(["/documents", "/pending-review"])
        .protected(["/dashboard", "/earnings", "/profile"])
        .unguarded(STATIC_ASSETS.iter().copied())
}

/// The bundled routing policy for the delivery-partner portal.
pub fn policy() -> Result<RoutingPolicy<DeliveryStatus>, PolicyError> {
    RoutingPolicy::builder(route_table())
        .login_path("/login")
        .dashboard_root("/dashboard")
        .routes(canonical_route)
        .build()
}
