//! Verification feature
//!
//! Bulk uploads and single-number checks. Both are commands: each run
//! debits the user's ledger for the numbers it verified.

pub mod artifact;
pub mod commands;
pub mod routes;

pub use routes::verification_routes;
