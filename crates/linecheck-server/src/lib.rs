//! Linecheck Server Library
//!
//! HTTP backend for bulk phone-number verification and billing.
//!
//! # Overview
//!
//! Users upload number lists (CSV/XLSX/TXT); the server deduplicates and
//! validates them against external lookup providers, debits a USDT balance
//! per verified number, and records each run with a downloadable result
//! file:
//!
//! - **API Endpoints**: multipart bulk verification, single-number checks,
//!   quota snapshots, run history
//! - **Ledger**: PostgreSQL via SQLx (quotas, balances, history)
//! - **Artifacts**: S3-compatible object storage with presigned downloads
//! - **Providers**: round-robin pool of validation-API credentials
//!
//! # Architecture
//!
//! The server follows a **CQRS (Command Query Responsibility Segregation)**
//! layout: each feature is a vertical slice with its own commands, queries,
//! and routes.
//!
//! - **Commands** (write operations): bulk verification runs and
//!   single-number checks, both of which debit the ledger
//! - **Queries** (read operations): quota snapshots and run history
//!
//! The verification pipeline itself is plain modules consumed by the
//! commands:
//!
//! ```text
//! ingest (file bytes -> candidates)
//!   -> normalize (filter, dedupe)
//!   -> verify (batched concurrent provider calls under quota)
//!   -> artifact + ledger debit + history row
//! ```
//!
//! ## Framework Stack
//!
//! - **Axum**: web framework (multipart uploads)
//! - **SQLx**: PostgreSQL access and migrations
//! - **Tower**: middleware (CORS, compression, tracing)

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod normalize;
pub mod providers;
pub mod storage;
pub mod verify;

// Re-export commonly used types
pub use error::{AppError, AppResult};
