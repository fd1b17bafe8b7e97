//! Database module
//!
//! Embedded SurrealDB (RocksDB engine). The schema below is applied on
//! every open; `IF NOT EXISTS` makes it idempotent.

pub mod models;
pub mod repository;

use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Schema applied at startup
///
/// The unique index on `user.email` is the storage-level duplicate-email
/// guard; the unique index on `cart.user` makes the per-user cart a true
/// singleton. The single-admin constraint needs no index: the admin
/// account lives at the fixed record id `user:admin`.
const SCHEMA: &str = "
DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
DEFINE INDEX IF NOT EXISTS user_email ON user FIELDS email UNIQUE;
DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
DEFINE TABLE IF NOT EXISTS cart SCHEMALESS;
DEFINE INDEX IF NOT EXISTS cart_user ON cart FIELDS user UNIQUE;
DEFINE TABLE IF NOT EXISTS orders SCHEMALESS;
DEFINE TABLE IF NOT EXISTS settings SCHEMALESS;
";

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `db_path` and apply the schema
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("boutique")
            .use_db("store")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?
            .check()
            .map_err(|e| AppError::database(format!("Schema statement failed: {e}")))?;

        tracing::info!(path = db_path, "Database opened, schema applied");

        Ok(Self { db })
    }
}
