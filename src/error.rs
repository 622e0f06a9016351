//! Error types for the portal gate.

use std::time::Duration;

/// Top-level error type for the gate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Routing policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Status error: {0}")]
    Status(#[from] StatusError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised while building a routing policy.
///
/// Every variant describes a table that could send an actor somewhere the
/// policy would immediately redirect away from again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("Invalid route {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Status {status} has no canonical route")]
    UnmappedStatus { status: String },

    #[error("No terminal status in the {portal} vocabulary")]
    NoTerminalStatus { portal: String },

    #[error("Multiple terminal statuses in the {portal} vocabulary: {first}, {second}")]
    MultipleTerminalStatuses {
        portal: String,
        first: String,
        second: String,
    },

    #[error("Route prefix {path} appears in both the {first} and {second} sets")]
    OverlappingRoute {
        path: String,
        first: String,
        second: String,
    },

    #[error("Login path {path} must be public, classified as {class}")]
    LoginNotPublic { path: String, class: String },

    #[error("Dashboard root {path} must be protected, classified as {class}")]
    DashboardNotProtected { path: String, class: String },

    #[error("Dashboard root {dashboard} is not under the terminal route {route}")]
    DashboardOutsideTerminalRoute { dashboard: String, route: String },

    #[error("Canonical route {route} for {status} must be an onboarding route, classified as {class}")]
    MisclassifiedRoute {
        status: String,
        route: String,
        class: String,
    },
}

/// Errors raised while obtaining an actor's onboarding status.
///
/// None of these reach the routing decision: the gate folds all of them
/// into the unauthenticated case.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("No authenticated session")]
    Unauthenticated,

    #[error("Unknown {portal} onboarding status: {value:?}")]
    UnknownStatus { portal: String, value: String },

    #[error("Status request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Status request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid status response: {reason}")]
    InvalidResponse { reason: String },
}

impl From<reqwest::Error> for StatusError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse {
                reason: e.to_string(),
            }
        } else {
            Self::RequestFailed {
                reason: e.to_string(),
            }
        }
    }
}

/// Result type alias for the gate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concern_errors_fold_into_gate_error() {
        let err: Error = ConfigError::MissingEnvVar("PORTAL_KIND".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required environment variable: PORTAL_KIND"
        );

        let err: Error = PolicyError::NoTerminalStatus {
            portal: "delivery".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Policy(PolicyError::NoTerminalStatus { .. })));

        let err: Error = StatusError::Timeout(Duration::from_millis(250)).into();
        assert_eq!(
            err.to_string(),
            "Status error: Status request timed out after 250ms"
        );
    }
}
