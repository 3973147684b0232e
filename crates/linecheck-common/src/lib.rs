//! Linecheck Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types and utilities for the linecheck workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all linecheck
//! workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Centralized tracing configuration and initialization
//! - **Phone**: Pure phone-number helpers (digit stripping, dial formatting)
//!
//! # Example
//!
//! ```no_run
//! use linecheck_common::phone::format_phone;
//!
//! let dialable = format_phone("(555) 123-4567", "+1");
//! assert_eq!(dialable.as_deref(), Some("+15551234567"));
//! ```

pub mod error;
pub mod logging;
pub mod phone;

// Re-export commonly used types
pub use error::{LinecheckError, Result};
