// src/db/mod.rs

//! Persistence seams. Handlers and pipelines only see these traits; `PgStore` and
//! `MemoryStore` are the two backends selected by configuration.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::StoreBackend;
use crate::errors::Result;
use crate::models::{
  Category, CategoryChanges, NewCategory, NewOrder, NewProduct, NewUser, Order, OrderChanges, Product,
  ProductChanges, ProductListing, Role, User,
};

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with `Conflict` when the (lowercased) email is taken.
  async fn create_user(&self, new_user: NewUser) -> Result<User>;
  async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
  /// Counts all users, or only those holding `role`.
  async fn count_users(&self, role: Option<Role>) -> Result<i64>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
  /// Newest first.
  async fn list_categories(&self, only_active: bool) -> Result<Vec<Category>>;
  async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>>;
  async fn create_category(&self, new_category: NewCategory) -> Result<Category>;
  async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> Result<Option<Category>>;
  async fn delete_category(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  /// Newest first, each with its category resolved when it still exists.
  async fn list_products(&self, only_active: bool) -> Result<Vec<ProductListing>>;
  async fn find_product_listing(&self, id: Uuid) -> Result<Option<ProductListing>>;
  /// Returns the products that exist among `ids`, in no particular order.
  async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
  async fn count_products_in_category(&self, category_id: Uuid) -> Result<i64>;
  async fn create_product(&self, new_product: NewProduct) -> Result<Product>;
  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>>;
  async fn delete_product(&self, id: Uuid) -> Result<bool>;
  /// Lowers stock by `quantity` in a single atomic row update and returns the new stock,
  /// or `None` if the product no longer exists. No floor is enforced here.
  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Option<i32>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn create_order(&self, new_order: NewOrder) -> Result<Order>;
  /// Newest first.
  async fn list_orders(&self) -> Result<Vec<Order>>;
  /// Orders placed under `email` (case-insensitive), newest first.
  async fn list_orders_by_email(&self, email: &str) -> Result<Vec<Order>>;
  async fn find_order(&self, id: Uuid) -> Result<Option<Order>>;
  async fn update_order(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>>;
  async fn delete_order(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait Store: UserStore + CategoryStore + ProductStore + OrderStore {
  /// Whether the backend currently answers queries.
  async fn ping(&self) -> bool;
}

/// Opens the configured backend. Postgres connections also run pending migrations.
pub async fn connect(backend: &StoreBackend) -> Result<Arc<dyn Store>> {
  match backend {
    StoreBackend::Postgres { url, max_connections } => {
      let store = PgStore::connect(url, *max_connections).await?;
      store.migrate().await?;
      Ok(Arc::new(store))
    }
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data will be lost on shutdown.");
      Ok(Arc::new(MemoryStore::new()))
    }
  }
}
