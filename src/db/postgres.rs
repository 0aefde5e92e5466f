// src/db/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{CategoryStore, OrderStore, ProductStore, Store, UserStore};
use crate::errors::{AppError, Result};
use crate::models::{
  Category, CategoryChanges, CategoryRef, NewCategory, NewOrder, NewProduct, NewUser, Order, OrderChanges, OrderItem,
  OrderStatus, PaymentMethod, PaymentStatus, Product, ProductChanges, ProductListing, Role, User,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, name, description, is_active, icon, color, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
  "id, name, price, stock, original_price, category_id, description, image_url, is_active, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, address, items, total_amount, \
   status, payment_status, payment_method, notes, created_at, updated_at";

const PRODUCT_LISTING_SELECT: &str = "SELECT p.id, p.name, p.price, p.stock, p.original_price, p.category_id, \
   p.description, p.image_url, p.is_active, p.created_at, p.updated_at, c.name AS category_name \
   FROM products p LEFT JOIN categories c ON c.id = p.category_id";

#[derive(FromRow)]
struct ProductListingRow {
  #[sqlx(flatten)]
  product: Product,
  category_name: Option<String>,
}

impl From<ProductListingRow> for ProductListing {
  fn from(row: ProductListingRow) -> Self {
    let category = match (row.product.category_id, row.category_name) {
      (Some(id), Some(name)) => Some(CategoryRef { id, name }),
      _ => None,
    };
    ProductListing {
      product: row.product,
      category,
    }
  }
}

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  customer_name: String,
  customer_email: String,
  customer_phone: Option<String>,
  address: Option<String>,
  items: Json<Vec<OrderItem>>,
  total_amount: Decimal,
  status: OrderStatus,
  payment_status: PaymentStatus,
  payment_method: PaymentMethod,
  notes: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
  fn from(row: OrderRow) -> Self {
    Order {
      id: row.id,
      customer_name: row.customer_name,
      customer_email: row.customer_email,
      customer_phone: row.customer_phone,
      address: row.address,
      items: row.items.0,
      total_amount: row.total_amount,
      status: row.status,
      payment_status: row.payment_status,
      payment_method: row.payment_method,
      notes: row.notes,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

/// Maps a unique-index violation to `Conflict`, anything else stays a database error.
fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
  match &err {
    sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(message.to_string()),
    _ => AppError::Sqlx(err),
  }
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  #[instrument(name = "PgStore::connect", skip(url), err(Display))]
  pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(url)
      .await?;
    info!("Successfully connected to the database.");
    Ok(Self { pool })
  }

  pub fn from_pool(pool: PgPool) -> Self {
    Self { pool }
  }

  #[instrument(name = "PgStore::migrate", skip(self), err(Display))]
  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    info!("Database migrations applied.");
    Ok(())
  }
}

#[async_trait]
impl UserStore for PgStore {
  #[instrument(name = "PgStore::create_user", skip(self, new_user), fields(email = %new_user.email), err(Display))]
  async fn create_user(&self, new_user: NewUser) -> Result<User> {
    let sql = format!(
      "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
      USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&sql)
      .bind(Uuid::new_v4())
      .bind(&new_user.name)
      .bind(&new_user.email)
      .bind(&new_user.password_hash)
      .bind(new_user.role)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| conflict_on_unique(e, "Email already registered"))
  }

  async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    Ok(
      sqlx::query_as::<_, User>(&sql)
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn count_users(&self, role: Option<Role>) -> Result<i64> {
    let count = match role {
      Some(role) => {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
          .bind(role)
          .fetch_one(&self.pool)
          .await?
      }
      None => {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
          .fetch_one(&self.pool)
          .await?
      }
    };
    Ok(count)
  }
}

#[async_trait]
impl CategoryStore for PgStore {
  async fn list_categories(&self, only_active: bool) -> Result<Vec<Category>> {
    let sql = format!(
      "SELECT {} FROM categories WHERE ($1 = FALSE OR is_active) ORDER BY created_at DESC",
      CATEGORY_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Category>(&sql)
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
    let sql = format!("SELECT {} FROM categories WHERE name = $1", CATEGORY_COLUMNS);
    Ok(
      sqlx::query_as::<_, Category>(&sql)
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::create_category", skip(self, new_category), fields(name = %new_category.name), err(Display))]
  async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
    let sql = format!(
      "INSERT INTO categories (id, name, description, is_active, icon, color) VALUES ($1, $2, $3, $4, $5, $6) \
       RETURNING {}",
      CATEGORY_COLUMNS
    );
    sqlx::query_as::<_, Category>(&sql)
      .bind(Uuid::new_v4())
      .bind(&new_category.name)
      .bind(&new_category.description)
      .bind(new_category.is_active)
      .bind(&new_category.icon)
      .bind(&new_category.color)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| conflict_on_unique(e, "Category name already exists"))
  }

  #[instrument(name = "PgStore::update_category", skip(self, changes), err(Display))]
  async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> Result<Option<Category>> {
    let sql = format!(
      "UPDATE categories SET name = COALESCE($2, name), description = COALESCE($3, description), \
       is_active = COALESCE($4, is_active), icon = COALESCE($5, icon), color = COALESCE($6, color), \
       updated_at = NOW() WHERE id = $1 RETURNING {}",
      CATEGORY_COLUMNS
    );
    sqlx::query_as::<_, Category>(&sql)
      .bind(id)
      .bind(&changes.name)
      .bind(&changes.description)
      .bind(changes.is_active)
      .bind(&changes.icon)
      .bind(&changes.color)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| conflict_on_unique(e, "Category name already exists"))
  }

  async fn delete_category(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}

#[async_trait]
impl ProductStore for PgStore {
  async fn list_products(&self, only_active: bool) -> Result<Vec<ProductListing>> {
    let sql = format!(
      "{} WHERE ($1 = FALSE OR p.is_active) ORDER BY p.created_at DESC",
      PRODUCT_LISTING_SELECT
    );
    let rows = sqlx::query_as::<_, ProductListingRow>(&sql)
      .bind(only_active)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(ProductListing::from).collect())
  }

  async fn find_product_listing(&self, id: Uuid) -> Result<Option<ProductListing>> {
    let sql = format!("{} WHERE p.id = $1", PRODUCT_LISTING_SELECT);
    let row = sqlx::query_as::<_, ProductListingRow>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(ProductListing::from))
  }

  async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS);
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn count_products_in_category(&self, category_id: Uuid) -> Result<i64> {
    Ok(
      sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::create_product", skip(self, new_product), fields(name = %new_product.name), err(Display))]
  async fn create_product(&self, new_product: NewProduct) -> Result<Product> {
    let sql = format!(
      "INSERT INTO products (id, name, price, stock, original_price, category_id, description, image_url, is_active) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
      PRODUCT_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(Uuid::new_v4())
        .bind(&new_product.name)
        .bind(new_product.price)
        .bind(new_product.stock)
        .bind(new_product.original_price)
        .bind(new_product.category_id)
        .bind(&new_product.description)
        .bind(&new_product.image_url)
        .bind(new_product.is_active)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::update_product", skip(self, changes), err(Display))]
  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>> {
    let sql = format!(
      "UPDATE products SET name = COALESCE($2, name), price = COALESCE($3, price), stock = COALESCE($4, stock), \
       original_price = COALESCE($5, original_price), category_id = COALESCE($6, category_id), \
       description = COALESCE($7, description), image_url = COALESCE($8, image_url), \
       is_active = COALESCE($9, is_active), updated_at = NOW() WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(&changes.name)
        .bind(changes.price)
        .bind(changes.stock)
        .bind(changes.original_price)
        .bind(changes.category_id)
        .bind(&changes.description)
        .bind(&changes.image_url)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::decrement_stock", skip(self), err(Display))]
  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Option<i32>> {
    let remaining = sqlx::query_scalar::<_, i32>(
      "UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1 RETURNING stock",
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await?;
    if let Some(stock) = remaining.filter(|s| *s < 0) {
      warn!(product_id = %id, stock, "Stock went negative after decrement.");
    }
    Ok(remaining)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "PgStore::create_order", skip(self, new_order), fields(customer_email = %new_order.customer_email), err(Display))]
  async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
    let sql = format!(
      "INSERT INTO orders (id, customer_name, customer_email, customer_phone, address, items, total_amount, \
       status, payment_status, payment_method, notes) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
      ORDER_COLUMNS
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(Uuid::new_v4())
      .bind(&new_order.customer_name)
      .bind(&new_order.customer_email)
      .bind(&new_order.customer_phone)
      .bind(&new_order.address)
      .bind(Json(&new_order.items))
      .bind(new_order.total_amount)
      .bind(OrderStatus::Pending)
      .bind(PaymentStatus::Unpaid)
      .bind(new_order.payment_method)
      .bind(&new_order.notes)
      .fetch_one(&self.pool)
      .await?;
    Ok(row.into())
  }

  async fn list_orders(&self) -> Result<Vec<Order>> {
    let sql = format!("SELECT {} FROM orders ORDER BY created_at DESC", ORDER_COLUMNS);
    let rows = sqlx::query_as::<_, OrderRow>(&sql).fetch_all(&self.pool).await?;
    Ok(rows.into_iter().map(Order::from).collect())
  }

  async fn list_orders_by_email(&self, email: &str) -> Result<Vec<Order>> {
    let sql = format!(
      "SELECT {} FROM orders WHERE LOWER(customer_email) = LOWER($1) ORDER BY created_at DESC",
      ORDER_COLUMNS
    );
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(email.trim())
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(Order::from).collect())
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    let row = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Order::from))
  }

  #[instrument(name = "PgStore::update_order", skip(self, changes), err(Display))]
  async fn update_order(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>> {
    let sql = format!(
      "UPDATE orders SET status = COALESCE($2, status), payment_status = COALESCE($3, payment_status), \
       notes = COALESCE($4, notes), updated_at = NOW() WHERE id = $1 RETURNING {}",
      ORDER_COLUMNS
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(id)
      .bind(changes.status)
      .bind(changes.payment_status)
      .bind(&changes.notes)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Order::from))
  }

  async fn delete_order(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}

#[async_trait]
impl Store for PgStore {
  async fn ping(&self) -> bool {
    match sqlx::query("SELECT 1").execute(&self.pool).await {
      Ok(_) => true,
      Err(e) => {
        warn!(error = %e, "Database ping failed.");
        false
      }
    }
  }
}
