//! Middleware components
//!
//! This module contains middleware for:
//! - Resolving the acting user forwarded by the upstream auth layer
//! - Reporting failures with the legacy 404 status

pub mod actor;
pub mod legacy_status;

pub use actor::{actor_middleware, Actor};
pub use legacy_status::legacy_status_middleware;
