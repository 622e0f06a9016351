//! Redirect policy: maps `(status, path)` to the page the actor belongs on.

use std::collections::HashMap;

use super::path;
use super::table::{RouteClass, RouteTable};
use crate::error::PolicyError;
use crate::onboarding::OnboardingStatus;

/// Why the policy wants the actor somewhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// No session, and the path is not public.
    Unauthenticated,
    /// Signed in but looking at a public page such as the login screen.
    AlreadyAuthenticated,
    /// Protected page requested before onboarding finished.
    OnboardingIncomplete,
    /// Onboarding page requested after onboarding finished.
    OnboardingComplete,
    /// Onboarding page for a different step than the current status.
    WrongStep,
}

impl std::fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::AlreadyAuthenticated => "already_authenticated",
            Self::OnboardingIncomplete => "onboarding_incomplete",
            Self::OnboardingComplete => "onboarding_complete",
            Self::WrongStep => "wrong_step",
        };
        write!(f, "{s}")
    }
}

/// Outcome of evaluating the policy for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    Allow,
    Redirect { to: &'a str, reason: RedirectReason },
}

impl<'a> Decision<'a> {
    pub fn target(&self) -> Option<&'a str> {
        match *self {
            Self::Allow => None,
            Self::Redirect { to, .. } => Some(to),
        }
    }
}

/// Validated routing policy for one portal's status vocabulary.
///
/// Stateless: every call depends only on its arguments.
#[derive(Debug, Clone)]
pub struct RoutingPolicy<S: OnboardingStatus> {
    table: RouteTable,
    routes: HashMap<S, String>,
    terminal: S,
    login_path: String,
    dashboard_root: String,
}

impl<S: OnboardingStatus> RoutingPolicy<S> {
    pub fn builder(table: RouteTable) -> PolicyBuilder<S> {
        PolicyBuilder::new(table)
    }

    /// Redirect target for `(status, path)`, or `None` to render the page.
    ///
    /// `status == None` means the actor is not authenticated.
    pub fn resolve_redirect(&self, status: Option<S>, current_path: &str) -> Option<&str> {
        self.decide(status, current_path).target()
    }

    /// Like [`resolve_redirect`](Self::resolve_redirect), with the reason.
    ///
    /// The checks run in a fixed priority order: already on the canonical
    /// route, public while authenticated, protected while not terminal,
    /// onboarding while terminal, wrong onboarding step.
    pub fn decide(&self, status: Option<S>, current_path: &str) -> Decision<'_> {
        let class = self.table.classify(current_path);

        let Some(status) = status else {
            return match class {
                RouteClass::Public | RouteClass::Unguarded => Decision::Allow,
                RouteClass::Onboarding | RouteClass::Protected => Decision::Redirect {
                    to: &self.login_path,
                    reason: RedirectReason::Unauthenticated,
                },
            };
        };

        let target = self.canonical_route(status);
        if path::is_within(current_path, target) {
            return Decision::Allow;
        }

        let terminal = status.is_terminal();
        match class {
            RouteClass::Public => Decision::Redirect {
                to: target,
                reason: RedirectReason::AlreadyAuthenticated,
            },
            RouteClass::Protected if !terminal => Decision::Redirect {
                to: target,
                reason: RedirectReason::OnboardingIncomplete,
            },
            RouteClass::Onboarding if terminal => Decision::Redirect {
                to: &self.dashboard_root,
                reason: RedirectReason::OnboardingComplete,
            },
            RouteClass::Onboarding => Decision::Redirect {
                to: target,
                reason: RedirectReason::WrongStep,
            },
            RouteClass::Protected | RouteClass::Unguarded => Decision::Allow,
        }
    }

    /// The single page an actor with `status` should be viewing.
    pub fn canonical_route(&self, status: S) -> &str {
        // The builder rejects unmapped values; login is the fail-closed answer.
        self.routes
            .get(&status)
            .map_or(self.login_path.as_str(), String::as_str)
    }

    pub fn terminal_status(&self) -> S {
        self.terminal
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn dashboard_root(&self) -> &str {
        &self.dashboard_root
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        self.table.classify(path)
    }
}

/// Collects the pieces of a [`RoutingPolicy`] and validates them together.
pub struct PolicyBuilder<S: OnboardingStatus> {
    table: RouteTable,
    routes: HashMap<S, String>,
    login_path: String,
    dashboard_root: String,
}

impl<S: OnboardingStatus> PolicyBuilder<S> {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            routes: HashMap::new(),
            login_path: "/login".to_string(),
            dashboard_root: "/dashboard".to_string(),
        }
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn dashboard_root(mut self, path: impl Into<String>) -> Self {
        self.dashboard_root = path.into();
        self
    }

    /// Map one status to its canonical route, replacing any earlier mapping.
    pub fn route(mut self, status: S, path: impl Into<String>) -> Self {
        self.routes.insert(status, path.into());
        self
    }

    /// Map every status through `f`.
    ///
    /// Pass a function with an exhaustive `match` so the compiler checks
    /// that no status is left out.
    pub fn routes(mut self, f: impl Fn(S) -> &'static str) -> Self {
        for &status in S::ALL {
            self.routes.insert(status, f(status).to_string());
        }
        self
    }

    pub fn build(self) -> Result<RoutingPolicy<S>, PolicyError> {
        self.table.validate()?;
        path::validate(&self.login_path)?;
        path::validate(&self.dashboard_root)?;

        let terminal = single_terminal::<S>()?;

        let login_class = self.table.classify(&self.login_path);
        if login_class != RouteClass::Public {
            return Err(PolicyError::LoginNotPublic {
                path: self.login_path,
                class: login_class.to_string(),
            });
        }

        let dashboard_class = self.table.classify(&self.dashboard_root);
        if dashboard_class != RouteClass::Protected {
            return Err(PolicyError::DashboardNotProtected {
                path: self.dashboard_root,
                class: dashboard_class.to_string(),
            });
        }

        for &status in S::ALL {
            let Some(route) = self.routes.get(&status) else {
                return Err(PolicyError::UnmappedStatus {
                    status: status.to_string(),
                });
            };
            path::validate(route)?;

            if status.is_terminal() {
                if !path::is_within(&self.dashboard_root, route) {
                    return Err(PolicyError::DashboardOutsideTerminalRoute {
                        dashboard: self.dashboard_root,
                        route: route.clone(),
                    });
                }
                continue;
            }

            let class = self.table.classify(route);
            if class != RouteClass::Onboarding {
                return Err(PolicyError::MisclassifiedRoute {
                    status: status.to_string(),
                    route: route.clone(),
                    class: class.to_string(),
                });
            }
        }

        tracing::debug!(
            portal = S::PORTAL,
            statuses = S::ALL.len(),
            terminal = %terminal,
            "Routing policy built"
        );

        Ok(RoutingPolicy {
            table: self.table,
            routes: self.routes,
            terminal,
            login_path: self.login_path,
            dashboard_root: self.dashboard_root,
        })
    }
}

fn single_terminal<S: OnboardingStatus>() -> Result<S, PolicyError> {
    let mut terminals = S::ALL.iter().copied().filter(|s| s.is_terminal());
    let Some(first) = terminals.next() else {
        return Err(PolicyError::NoTerminalStatus {
            portal: S::PORTAL.to_string(),
        });
    };
    if let Some(second) = terminals.next() {
        return Err(PolicyError::MultipleTerminalStatuses {
            portal: S::PORTAL.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        });
    }
    Ok(first)
}
