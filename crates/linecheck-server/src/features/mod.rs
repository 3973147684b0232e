//! Feature modules implementing the linecheck API
//!
//! Each feature is a vertical slice following the CQRS (Command Query
//! Responsibility Segregation) pattern, with its own commands, queries,
//! and routes.
//!
//! # Features
//!
//! - **verification**: bulk uploads and single-number checks (commands;
//!   both debit the ledger)
//! - **quotas**: per-user usage/balance snapshots (queries)
//! - **history**: past verification runs with downloadable artifacts
//!   (queries)
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Shared types (if needed)
//!
//! Commands and queries implement the mediator pattern using the `mediator`
//! crate, enabling clean separation of concerns and easy testing.

pub mod history;
pub mod quotas;
pub mod shared;
pub mod verification;

use axum::Router;
use std::sync::Arc;

use crate::{config::VerificationConfig, providers::ProviderPool, storage::Storage};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool (the ledger store)
    pub db: sqlx::PgPool,
    /// S3-compatible storage for result artifacts
    pub storage: Storage,
    /// Round-robin validation-provider pool
    pub providers: Arc<ProviderPool>,
    /// Pipeline tuning (batch size, unit cost, default country code)
    pub verification: VerificationConfig,
}

/// Creates the main API router with all feature routes mounted
///
/// - `/verify` - bulk and single-number verification
/// - `/quotas` - usage/balance snapshots
/// - `/history` - past runs with download links
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest(
            "/verify",
            verification::verification_routes().with_state(state.clone()),
        )
        .nest("/quotas", quotas::quotas_routes().with_state(state.db.clone()))
        .nest("/history", history::history_routes().with_state(state))
}
