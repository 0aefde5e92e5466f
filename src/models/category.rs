// src/models/category.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub is_active: bool,
  pub icon: Option<String>,
  pub color: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// The `{ id, name }` pair attached to product reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
  pub id: Uuid,
  pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
  pub name: String,
  pub description: Option<String>,
  pub is_active: bool,
  pub icon: Option<String>,
  pub color: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
  pub name: Option<String>,
  pub description: Option<String>,
  pub is_active: Option<bool>,
  pub icon: Option<String>,
  pub color: Option<String>,
}
