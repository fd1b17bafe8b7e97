//! User repository

use super::{BaseRepository, CountRow, RepoError, RepoResult, strip_table_prefix};
use crate::auth::OAuthProvider;
use crate::db::models::{Address, Role, User};
use shared::util;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

/// Fixed record key for the single administrator account
pub const ADMIN_KEY: &str = "admin";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a client user; the unique email index rejects duplicates
    pub async fn create(&self, user: User) -> RepoResult<User> {
        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Create the administrator at the fixed record id `user:admin`
    ///
    /// A concurrent second call fails at the storage layer (record id
    /// collision), which is what makes the single-admin invariant
    /// race-free.
    pub async fn create_admin(&self, user: User) -> RepoResult<User> {
        let created: Option<User> = self
            .base
            .db()
            .create((USER_TABLE, ADMIN_KEY))
            .content(user)
            .await?;
        created.ok_or_else(|| RepoError::Duplicate("administrator".to_string()))
    }

    /// Find the administrator account, if bootstrapped
    pub async fn find_admin(&self) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select((USER_TABLE, ADMIN_KEY)).await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let pure_id = strip_table_prefix(USER_TABLE, id);
        let user: Option<User> = self.base.db().select((USER_TABLE, pure_id)).await?;
        Ok(user)
    }

    /// Lookup by normalized email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user: Option<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", util::normalize_email(email)))
            .await?
            .take(0)?;
        Ok(user)
    }

    /// Lookup by external provider id
    pub async fn find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> RepoResult<Option<User>> {
        let query = match provider {
            OAuthProvider::Google => "SELECT * FROM user WHERE google_id = $pid LIMIT 1",
            OAuthProvider::Facebook => "SELECT * FROM user WHERE facebook_id = $pid LIMIT 1",
        };
        let user: Option<User> = self
            .base
            .db()
            .query(query)
            .bind(("pid", provider_id.to_string()))
            .await?
            .take(0)?;
        Ok(user)
    }

    /// Backfill a missing provider id on an existing account
    pub async fn set_provider_id(
        &self,
        user_id: &str,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> RepoResult<()> {
        let pure_id = strip_table_prefix(USER_TABLE, user_id).to_string();
        let query = match provider {
            OAuthProvider::Google => {
                "UPDATE type::thing('user', $id) SET google_id = $pid"
            }
            OAuthProvider::Facebook => {
                "UPDATE type::thing('user', $id) SET facebook_id = $pid"
            }
        };
        self.base
            .db()
            .query(query)
            .bind(("id", pure_id))
            .bind(("pid", provider_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }

    /// Refresh the last-login timestamp
    pub async fn touch_last_login(&self, user_id: &str, now: i64) -> RepoResult<()> {
        let pure_id = strip_table_prefix(USER_TABLE, user_id).to_string();
        self.base
            .db()
            .query("UPDATE type::thing('user', $id) SET last_login = $now")
            .bind(("id", pure_id))
            .bind(("now", now))
            .await?
            .check()?;
        Ok(())
    }

    /// Apply a profile/admin update; only provided fields are written
    pub async fn update(
        &self,
        user_id: &str,
        first_name: Option<String>,
        last_name: Option<String>,
        phone: Option<String>,
        address: Option<Address>,
        is_active: Option<bool>,
    ) -> RepoResult<User> {
        let pure_id = strip_table_prefix(USER_TABLE, user_id).to_string();

        let mut set_parts: Vec<&str> = Vec::new();
        if first_name.is_some() {
            set_parts.push("first_name = $first_name");
        }
        if last_name.is_some() {
            set_parts.push("last_name = $last_name");
        }
        if phone.is_some() {
            set_parts.push("phone = $phone");
        }
        if address.is_some() {
            set_parts.push("address = $address");
        }
        if is_active.is_some() {
            set_parts.push("is_active = $is_active");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(&pure_id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("User {user_id} not found")));
        }

        let query_str = format!(
            "UPDATE type::thing('user', $id) SET {} RETURN AFTER",
            set_parts.join(", ")
        );

        let mut query = self.base.db().query(&query_str).bind(("id", pure_id));
        if let Some(v) = first_name {
            query = query.bind(("first_name", v));
        }
        if let Some(v) = last_name {
            query = query.bind(("last_name", v));
        }
        if let Some(v) = phone {
            query = query.bind(("phone", v));
        }
        if let Some(v) = address {
            query = query.bind(("address", v));
        }
        if let Some(v) = is_active {
            query = query.bind(("is_active", v));
        }

        let users: Vec<User> = query.await?.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {user_id} not found")))
    }

    pub async fn set_password_hash(&self, user_id: &str, hash: String) -> RepoResult<()> {
        let pure_id = strip_table_prefix(USER_TABLE, user_id).to_string();
        self.base
            .db()
            .query("UPDATE type::thing('user', $id) SET password_hash = $hash")
            .bind(("id", pure_id))
            .bind(("hash", hash))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn delete(&self, user_id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(USER_TABLE, user_id);
        let deleted: Option<User> = self.base.db().delete((USER_TABLE, pure_id)).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("User {user_id} not found")));
        }
        Ok(())
    }

    /// Page of users, newest first
    pub async fn find_page(&self, page: u32, limit: u32) -> RepoResult<(Vec<User>, u64)> {
        let start = (page.max(1) - 1) as i64 * limit as i64;
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at DESC LIMIT $limit START $start")
            .bind(("limit", limit as i64))
            .bind(("start", start))
            .await?
            .take(0)?;

        let total = self.count_all().await?;
        Ok((users, total))
    }

    async fn count_all(&self) -> RepoResult<u64> {
        let row: Option<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM user GROUP ALL")
            .await?
            .take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Number of client-role users (the dashboard "users" counter)
    pub async fn count_clients(&self) -> RepoResult<u64> {
        let row: Option<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM user WHERE role = $role GROUP ALL")
            .bind(("role", Role::Client))
            .await?
            .take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Email addresses of all active clients (new-product notifications)
    pub async fn client_emails(&self) -> RepoResult<Vec<String>> {
        #[derive(serde::Deserialize)]
        struct EmailRow {
            email: String,
        }

        let rows: Vec<EmailRow> = self
            .base
            .db()
            .query("SELECT email FROM user WHERE role = $role AND is_active = true")
            .bind(("role", Role::Client))
            .await?
            .take(0)?;
        Ok(rows.into_iter().map(|r| r.email).collect())
    }
}
