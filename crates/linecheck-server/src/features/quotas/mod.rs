//! Quotas feature
//!
//! Read-only snapshots of a user's verification usage and USDT balance.

pub mod queries;
pub mod routes;

pub use routes::quotas_routes;
