//! Repository module
//!
//! CRUD access to the document store, one repository per collection.

pub mod cart;
pub mod order;
pub mod product;
pub mod settings;
pub mod user;

pub use cart::CartRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use settings::SettingsRepository;
pub use user::UserRepository;

use shared::{AppError, ErrorCode};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl RepoError {
    pub(crate) fn is_duplicate(&self) -> bool {
        matches!(self, RepoError::Duplicate(_))
    }
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violations and fixed-record-id collisions both
        // surface as "already" errors from the engine
        if msg.contains("already contains") || msg.contains("already exists") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Strip a `table:` prefix from an id if present
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(&format!("{table}:"))
        .unwrap_or(id)
        .trim_start_matches('⟨')
        .trim_end_matches('⟩')
}

/// Build a [`RecordId`] from a table name and an id with or without prefix
pub fn record_id(table: &str, id: &str) -> surrealdb::RecordId {
    surrealdb::RecordId::from_table_key(table, strip_table_prefix(table, id))
}

/// Row shape for `SELECT count() ... GROUP ALL` queries
#[derive(serde::Deserialize)]
pub(crate) struct CountRow {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_table_prefix() {
        assert_eq!(strip_table_prefix("user", "user:abc"), "abc");
        assert_eq!(strip_table_prefix("user", "abc"), "abc");
        assert_eq!(strip_table_prefix("product", "user:abc"), "user:abc");
        assert_eq!(strip_table_prefix("user", "user:⟨abc-def⟩"), "abc-def");
    }
}
