//! The shape shared by every portal's onboarding vocabulary.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::Serialize;

use crate::error::StatusError;

/// A closed set of onboarding stages for one portal.
///
/// Implementors are plain fieldless enums. Exactly one value must be
/// terminal; [`RoutingPolicy`](crate::routing::RoutingPolicy) refuses to
/// build otherwise.
pub trait OnboardingStatus:
    Copy + Eq + Hash + Debug + Display + Serialize + Send + Sync + 'static
{
    /// Portal name, used in logs and error messages.
    const PORTAL: &'static str;

    /// Every value of the vocabulary, in onboarding order.
    const ALL: &'static [Self];

    /// Whether this status unlocks the protected routes.
    fn is_terminal(self) -> bool;

    /// Human-readable label for display.
    fn label(self) -> &'static str;

    /// Extra wire spellings accepted on input for a value.
    fn aliases(self) -> &'static [&'static str] {
        &[]
    }

    /// Parse a wire value reported by the backend.
    ///
    /// Matching is exact against the canonical spelling or an alias; an
    /// unrecognised value is an error, never a guess.
    fn parse(raw: &str) -> Result<Self, StatusError> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.to_string() == raw || s.aliases().contains(&raw))
            .ok_or_else(|| StatusError::UnknownStatus {
                portal: Self::PORTAL.to_string(),
                value: raw.to_string(),
            })
    }
}
