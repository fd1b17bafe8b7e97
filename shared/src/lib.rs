//! Shared types for the boutique backend
//!
//! Common types used across crates: error codes, the unified API
//! response envelope, pagination, and small utilities.

pub mod error;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, Paginated};
pub use serde::{Deserialize, Serialize};
