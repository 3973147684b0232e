//! History feature
//!
//! Past verification runs with presigned links to their result artifacts.

pub mod queries;
pub mod routes;

pub use routes::history_routes;
