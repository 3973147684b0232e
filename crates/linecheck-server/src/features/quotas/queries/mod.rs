//! Quota queries (read operations)

pub mod get_quota;

pub use get_quota::{GetQuotaError, GetQuotaQuery, GetQuotaResponse};
