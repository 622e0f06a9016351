//! Restaurant-owner onboarding: documents, bank details, review, dashboard.

use serde::{Deserialize, Serialize};

use super::status::OnboardingStatus;
use crate::error::{PolicyError, StatusError};
use crate::routing::{RouteTable, RoutingPolicy, STATIC_ASSETS};

/// Verification progress of a restaurant owner.
///
/// PendingDocuments → PendingBankDetails → PendingReview, which ends in
/// either Completed or Rejected. A rejected owner stays on the review page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestaurantStatus {
    PendingDocuments,
    PendingBankDetails,
    PendingReview,
    /// Older restaurant backends report this value as `APPROVED`.
    #[serde(alias = "APPROVED")]
    Completed,
    Rejected,
}

impl OnboardingStatus for RestaurantStatus {
    const PORTAL: &'static str = "restaurant";
    const ALL: &'static [Self] = &[
        Self::PendingDocuments,
        Self::PendingBankDetails,
        Self::PendingReview,
        Self::Completed,
        Self::Rejected,
    ];

    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    fn label(self) -> &'static str {
        match self {
            Self::PendingDocuments => "Pending documents",
            Self::PendingBankDetails => "Pending bank details",
            Self::PendingReview => "Pending review",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Completed => &["APPROVED"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PendingDocuments => "PENDING_DOCUMENTS",
            Self::PendingBankDetails => "PENDING_BANK_DETAILS",
            Self::PendingReview => "PENDING_REVIEW",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RestaurantStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical page for each status.
pub fn canonical_route(status: RestaurantStatus) -> &'static str {
    match status {
        RestaurantStatus::PendingDocuments => "/documents",
        RestaurantStatus::PendingBankDetails => "/bank-details",
        RestaurantStatus::PendingReview | RestaurantStatus::Rejected => "/pending-review",
        RestaurantStatus::Completed => "/dashboard",
    }
}

/// Path classification for the restaurant-owner portal.
pub fn route_table() -> RouteTable {
    RouteTable::new()
        .public(["/", "/login", "/verify-otp"])
        .onboarding(["/documents", "/bank-details", "/pending-review"])
        .protected(["/dashboard", "/menu", "/orders", "/profile"])
        .unguarded(STATIC_ASSETS.iter().copied())
}

/// The bundled routing policy for the restaurant-owner portal.
pub fn policy() -> Result<RoutingPolicy<RestaurantStatus>, PolicyError> {
    RoutingPolicy::builder(route_table())
        .login_path("/login")
        .dashboard_root("/dashboard")
        .routes(canonical_route)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteClass;

    fn sample_paths() -> Vec<String> {
        route_table()
            .entries()
            .flat_map(|(_, p)| [p.to_string(), format!("{p}/42")])
            .chain(["/support".to_string()])
            .collect()
    }

    #[test]
    fn concrete_scenarios() {
        let p = policy().unwrap();
        assert_eq!(
            p.resolve_redirect(Some(RestaurantStatus::PendingBankDetails), "/documents"),
            Some("/bank-details")
        );
        assert_eq!(
            p.resolve_redirect(Some(RestaurantStatus::Rejected), "/dashboard"),
            Some("/pending-review")
        );
        assert_eq!(
            p.resolve_redirect(Some(RestaurantStatus::Completed), "/bank-details"),
            Some("/dashboard")
        );
    }

    #[test]
    fn rejected_shares_review_page_with_pending_review() {
        let p = policy().unwrap();
        assert_eq!(
            p.canonical_route(RestaurantStatus::Rejected),
            p.canonical_route(RestaurantStatus::PendingReview)
        );
        assert_eq!(
            p.resolve_redirect(Some(RestaurantStatus::Rejected), "/pending-review"),
            None
        );
        assert!(!RestaurantStatus::Rejected.is_terminal());
    }

    #[test]
    fn order_detail_pages_stay_open_once_completed() {
        let p = policy().unwrap();
        assert_eq!(
            p.resolve_redirect(Some(RestaurantStatus::Completed), "/orders/42"),
            None
        );
        assert_eq!(
            p.resolve_redirect(Some(RestaurantStatus::Completed), "/dashboard/orders/42"),
            None
        );
    }

    #[test]
    fn every_status_path_pair_follows_the_policy() {
        let p = policy().unwrap();
        for &status in RestaurantStatus::ALL {
            let route = canonical_route(status);
            for path in sample_paths() {
                let redirect = p.resolve_redirect(Some(status), &path);
                match p.classify(&path) {
                    RouteClass::Protected if !status.is_terminal() => {
                        assert_eq!(redirect, Some(route), "{status} at {path}")
                    }
                    RouteClass::Onboarding if status.is_terminal() => {
                        assert_eq!(redirect, Some("/dashboard"), "{status} at {path}")
                    }
                    _ => {}
                }
                if let Some(target) = redirect {
                    assert_eq!(p.resolve_redirect(Some(status), target), None);
                }
            }
            assert_eq!(p.resolve_redirect(Some(status), route), None);
        }
    }

    #[test]
    fn anonymous_visitors_are_sent_to_login() {
        let p = policy().unwrap();
        for path in sample_paths() {
            let expected = match p.classify(&path) {
                RouteClass::Public | RouteClass::Unguarded => None,
                _ => Some("/login"),
            };
            assert_eq!(p.resolve_redirect(None, &path), expected, "anonymous at {path}");
        }
        assert_eq!(p.resolve_redirect(None, "/support"), Some("/login"));
        assert_eq!(p.resolve_redirect(None, "/verify-otp"), None);
    }

    #[test]
    fn every_redirect_settles_in_one_hop() {
        let p = policy().unwrap();
        let statuses =
            std::iter::once(None).chain(RestaurantStatus::ALL.iter().copied().map(Some));
        for status in statuses {
            for path in sample_paths() {
                if let Some(target) = p.resolve_redirect(status, &path) {
                    assert_eq!(p.resolve_redirect(status, target), None, "{status:?} {path}");
                }
            }
        }
    }

    #[test]
    fn static_assets_are_served_to_everyone() {
        let p = policy().unwrap();
        let statuses =
            std::iter::once(None).chain(RestaurantStatus::ALL.iter().copied().map(Some));
        for status in statuses {
            assert_eq!(p.resolve_redirect(status, "/_next/static/chunks/main.js"), None);
            assert_eq!(p.resolve_redirect(status, "/favicon.ico"), None);
        }
    }

    #[test]
    fn display_matches_serde() {
        for &status in RestaurantStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(format!("\"{status}\""), json);
        }
    }

    #[test]
    fn legacy_approved_spelling_maps_to_completed() {
        assert_eq!(
            "APPROVED".parse::<RestaurantStatus>().unwrap(),
            RestaurantStatus::Completed
        );
        let parsed: RestaurantStatus = serde_json::from_str("\"APPROVED\"").unwrap();
        assert_eq!(parsed, RestaurantStatus::Completed);
        // Never emitted.
        assert_eq!(RestaurantStatus::Completed.to_string(), "COMPLETED");
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("PENDING".parse::<RestaurantStatus>().is_err());
        assert!("".parse::<RestaurantStatus>().is_err());
    }
}
