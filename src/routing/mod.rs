//! Onboarding router: decides where a partially-onboarded actor may go.

pub mod path;
pub mod policy;
pub mod table;

pub use policy::{Decision, PolicyBuilder, RedirectReason, RoutingPolicy};
pub use table::{RouteClass, RouteTable, STATIC_ASSETS, UnmatchedRoutes};
