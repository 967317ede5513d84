//! Business logic services

pub mod license_keys;
pub mod route_gate;

pub use license_keys::{GeneratedKey, LicenseKeyGenerator};
pub use route_gate::{ApiRoute, RouteGate};
