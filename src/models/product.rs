// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::CategoryRef;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub stock: i32,
  pub original_price: Option<Decimal>,
  /// Weak reference: the category may since have been deleted.
  pub category_id: Option<Uuid>,
  pub description: Option<String>,
  pub image_url: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A product as served by catalog reads, with its category resolved when it still exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListing {
  #[serde(flatten)]
  pub product: Product,
  pub category: Option<CategoryRef>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
  pub name: String,
  pub price: Decimal,
  pub stock: i32,
  pub original_price: Option<Decimal>,
  pub category_id: Option<Uuid>,
  pub description: Option<String>,
  pub image_url: Option<String>,
  pub is_active: bool,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
  pub name: Option<String>,
  pub price: Option<Decimal>,
  pub stock: Option<i32>,
  pub original_price: Option<Decimal>,
  pub category_id: Option<Uuid>,
  pub description: Option<String>,
  pub image_url: Option<String>,
  pub is_active: Option<bool>,
}
