//! Route classification table: the static partition of a portal's paths.

use serde::Serialize;

use super::path;
use crate::error::PolicyError;

/// Prefixes of the static assets a portal's exported pages load.
pub const STATIC_ASSETS: &[&str] = &["/_next", "/favicon.ico"];

/// Which set a path belongs to for gating purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    /// Reachable without a session (login, OTP verification, landing page).
    Public,
    /// Requires a session; any non-terminal status may be here.
    Onboarding,
    /// Requires a session and the terminal status.
    Protected,
    /// Not gated at all.
    Unguarded,
}

impl std::fmt::Display for RouteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Onboarding => "onboarding",
            Self::Protected => "protected",
            Self::Unguarded => "unguarded",
        };
        write!(f, "{s}")
    }
}

/// How to treat a path that matches no configured prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedRoutes {
    /// Gate it like an onboarding page.
    #[default]
    Onboarding,
    /// Leave it alone.
    Unguarded,
}

/// Prefix table classifying every path of a portal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteTable {
    public: Vec<String>,
    onboarding: Vec<String>,
    protected: Vec<String>,
    /// Never gated; static assets the exported pages load.
    unguarded: Vec<String>,
    unmatched: UnmatchedRoutes,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.public.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn onboarding<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.onboarding.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn protected<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.protected.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn unguarded<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.unguarded.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn unmatched(mut self, unmatched: UnmatchedRoutes) -> Self {
        self.unmatched = unmatched;
        self
    }

    /// Classify a path.
    ///
    /// The longest matching prefix wins, so an onboarding page nested inside
    /// a protected section is still an onboarding page.
    pub fn classify(&self, path: &str) -> RouteClass {
        let mut best: Option<(usize, RouteClass)> = None;

        for (class, prefix) in self.entries() {
            if !path::is_within(path, prefix) {
                continue;
            }
            let len = path::normalize(prefix).len();
            if best.is_none_or(|(best_len, _)| len > best_len) {
                best = Some((len, class));
            }
        }

        match best {
            Some((_, class)) => class,
            None => match self.unmatched {
                UnmatchedRoutes::Onboarding => RouteClass::Onboarding,
                UnmatchedRoutes::Unguarded => RouteClass::Unguarded,
            },
        }
    }

    /// Every configured prefix, tagged with its class.
    pub fn entries(&self) -> impl Iterator<Item = (RouteClass, &str)> {
        tagged(RouteClass::Public, &self.public)
            .chain(tagged(RouteClass::Onboarding, &self.onboarding))
            .chain(tagged(RouteClass::Protected, &self.protected))
            .chain(tagged(RouteClass::Unguarded, &self.unguarded))
    }

    /// Check every prefix is well formed and belongs to exactly one set.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let entries: Vec<(RouteClass, &str)> = self.entries().collect();

        for (i, (class, prefix)) in entries.iter().enumerate() {
            path::validate(prefix)?;
            for (other_class, other) in &entries[i + 1..] {
                if other_class != class && path::normalize(prefix) == path::normalize(other) {
                    return Err(PolicyError::OverlappingRoute {
                        path: prefix.to_string(),
                        first: class.to_string(),
                        second: other_class.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn tagged(class: RouteClass, paths: &[String]) -> impl Iterator<Item = (RouteClass, &str)> {
    paths.iter().map(move |p| (class, p.as_str()))
}
