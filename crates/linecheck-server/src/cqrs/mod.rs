//! CQRS mediator wiring
//!
//! Commands and queries implement [`mediator::Request`] and are registered
//! here; the marker traits distinguish writes from reads for callers that
//! dispatch through the mediator. Route handlers call the slice `handle`
//! functions directly.

pub use mediator::DefaultAsyncMediator;

use crate::features::FeatureState;

pub type AppMediator = DefaultAsyncMediator;

/// Marker for write operations.
pub trait Command {}

/// Marker for read operations.
pub trait Query {}

pub fn build_mediator(state: FeatureState) -> AppMediator {
    DefaultAsyncMediator::builder()
        // Verification
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move {
                    crate::features::verification::commands::verify_bulk::handle(state, cmd).await
                }
            }
        })
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move {
                    crate::features::verification::commands::verify_single::handle(state, cmd).await
                }
            }
        })
        // Quotas
        .add_handler({
            let pool = state.db.clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::quotas::queries::get_quota::handle(pool, query).await }
            }
        })
        // History
        .add_handler({
            let state = state.clone();
            move |query| {
                let state = state.clone();
                async move { crate::features::history::queries::list_runs::handle(state, query).await }
            }
        })
        .build()
}
