//! Product repository

use super::{BaseRepository, CountRow, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use shared::util;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.price < 0.0 {
            return Err(RepoError::Validation("price must not be negative".into()));
        }
        if data.sizes.iter().flatten().any(|s| s.stock < 0) {
            return Err(RepoError::Validation("stock must not be negative".into()));
        }

        let product = Product {
            id: None,
            name: data.name,
            description: data.description,
            price: data.price,
            sale_price: data.sale_price,
            category: data.category,
            audience: data.audience,
            brand: data.brand,
            images: data.images.unwrap_or_default(),
            sizes: data.sizes.unwrap_or_default(),
            colors: data.colors.unwrap_or_default(),
            rating: 0.0,
            rating_count: 0,
            on_sale: data.on_sale.unwrap_or(false),
            is_new: data.is_new.unwrap_or(false),
            popular: data.popular.unwrap_or(false),
            created_at: util::now_millis(),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = strip_table_prefix(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select((PRODUCT_TABLE, pure_id)).await?;
        Ok(product)
    }

    /// Page of products, newest first
    pub async fn find_page(&self, page: u32, limit: u32) -> RepoResult<(Vec<Product>, u64)> {
        let start = (page.max(1) - 1) as i64 * limit as i64;
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY created_at DESC LIMIT $limit START $start")
            .bind(("limit", limit as i64))
            .bind(("start", start))
            .await?
            .take(0)?;

        let total = self.count().await?;
        Ok((products, total))
    }

    pub async fn count(&self) -> RepoResult<u64> {
        let row: Option<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM product GROUP ALL")
            .await?
            .take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Update a product; only provided fields are written
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let pure_id = strip_table_prefix(PRODUCT_TABLE, id).to_string();

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() { set_parts.push("name = $name"); }
        if data.description.is_some() { set_parts.push("description = $description"); }
        if data.price.is_some() { set_parts.push("price = $price"); }
        if data.sale_price.is_some() { set_parts.push("sale_price = $sale_price"); }
        if data.category.is_some() { set_parts.push("category = $category"); }
        if data.audience.is_some() { set_parts.push("audience = $audience"); }
        if data.brand.is_some() { set_parts.push("brand = $brand"); }
        if data.images.is_some() { set_parts.push("images = $images"); }
        if data.sizes.is_some() { set_parts.push("sizes = $sizes"); }
        if data.colors.is_some() { set_parts.push("colors = $colors"); }
        if data.on_sale.is_some() { set_parts.push("on_sale = $on_sale"); }
        if data.is_new.is_some() { set_parts.push("is_new = $is_new"); }
        if data.popular.is_some() { set_parts.push("popular = $popular"); }

        if set_parts.is_empty() {
            return self
                .find_by_id(&pure_id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")));
        }

        let query_str = format!(
            "UPDATE type::thing('product', $id) SET {} RETURN AFTER",
            set_parts.join(", ")
        );

        let mut query = self.base.db().query(&query_str).bind(("id", pure_id));
        if let Some(v) = data.name { query = query.bind(("name", v)); }
        if let Some(v) = data.description { query = query.bind(("description", v)); }
        if let Some(v) = data.price { query = query.bind(("price", v)); }
        if let Some(v) = data.sale_price { query = query.bind(("sale_price", v)); }
        if let Some(v) = data.category { query = query.bind(("category", v)); }
        if let Some(v) = data.audience { query = query.bind(("audience", v)); }
        if let Some(v) = data.brand { query = query.bind(("brand", v)); }
        if let Some(v) = data.images { query = query.bind(("images", v)); }
        if let Some(v) = data.sizes { query = query.bind(("sizes", v)); }
        if let Some(v) = data.colors { query = query.bind(("colors", v)); }
        if let Some(v) = data.on_sale { query = query.bind(("on_sale", v)); }
        if let Some(v) = data.is_new { query = query.bind(("is_new", v)); }
        if let Some(v) = data.popular { query = query.bind(("popular", v)); }

        let products: Vec<Product> = query.await?.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(PRODUCT_TABLE, id);
        let deleted: Option<Product> = self.base.db().delete((PRODUCT_TABLE, pure_id)).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Product {id} not found")));
        }
        Ok(())
    }

    /// Atomically decrement a size's stock counter
    ///
    /// Single UPDATE statement keyed by {product, size} - not a
    /// read-modify-write of the whole document, so two concurrent orders
    /// against the same size both land their decrements. The counter is
    /// allowed to go negative; the order engine never guards it.
    pub async fn decrement_stock(&self, product_id: &str, size: &str, qty: i64) -> RepoResult<()> {
        let pure_id = strip_table_prefix(PRODUCT_TABLE, product_id).to_string();
        self.base
            .db()
            .query("UPDATE type::thing('product', $id) SET sizes[WHERE name = $size].stock -= $qty")
            .bind(("id", pure_id))
            .bind(("size", size.to_string()))
            .bind(("qty", qty))
            .await?
            .check()?;
        Ok(())
    }
}
