//! Onboarding vocabularies for the partner portals.
//!
//! Each portal tracks an actor's verification progress as a closed status
//! enum owned by the backend. The gate only reads these values; it never
//! computes a transition itself.

pub mod delivery;
pub mod restaurant;
pub mod status;

pub use delivery::DeliveryStatus;
pub use restaurant::RestaurantStatus;
pub use status::OnboardingStatus;
