//! Cart repository
//!
//! Carts are scoped to one owning user; the unique index on `cart.user`
//! keeps them singletons.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Cart;
use shared::util;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const CART_TABLE: &str = "cart";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Option<Cart>> {
        let cart: Option<Cart> = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE user = $user LIMIT 1")
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(cart)
    }

    /// Fetch the user's cart, creating an empty one on first access
    pub async fn get_or_create(&self, user: &RecordId) -> RepoResult<Cart> {
        if let Some(cart) = self.find_by_user(user).await? {
            return Ok(cart);
        }

        let created: Result<Option<Cart>, surrealdb::Error> = self
            .base
            .db()
            .create(CART_TABLE)
            .content(Cart::empty(user.clone(), util::now_millis()))
            .await;

        match created {
            Ok(Some(cart)) => Ok(cart),
            // Lost a create race against another request for the same user;
            // the unique index rejected us, the winner's cart is now there
            Err(e) if RepoError::from(e).is_duplicate() => self
                .find_by_user(user)
                .await?
                .ok_or_else(|| RepoError::Database("Cart vanished after create race".into())),
            Ok(None) => Err(RepoError::Database("Failed to create cart".into())),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the full item list (merges happen in [`Cart`] model code)
    pub async fn save_items(&self, cart: &Cart) -> RepoResult<Cart> {
        let id = cart
            .id
            .as_ref()
            .ok_or_else(|| RepoError::Validation("Cart has no id".into()))?;

        let updated: Vec<Cart> = self
            .base
            .db()
            .query("UPDATE $cart SET items = $items, updated_at = $now RETURN AFTER")
            .bind(("cart", id.clone()))
            .bind(("items", cart.items.clone()))
            .bind(("now", util::now_millis()))
            .await?
            .take(0)?;

        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound("Cart not found".into()))
    }

    /// Atomically empty the user's cart (order conversion)
    pub async fn clear(&self, user: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE cart SET items = [], updated_at = $now WHERE user = $user")
            .bind(("user", user.to_string()))
            .bind(("now", util::now_millis()))
            .await?
            .check()?;
        Ok(())
    }
}
