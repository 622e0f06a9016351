//! Portal gate: onboarding-status route gating for the partner portals.

pub mod config;
pub mod error;
pub mod guard;
pub mod onboarding;
pub mod routing;
pub mod server;
pub mod session;
