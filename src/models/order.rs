// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type as SqlxType;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// Largest amount a NUMERIC(12, 2) money column holds: 9_999_999_999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

pub const AMOUNT_TOO_LARGE_MESSAGE: &str = "Order total is too large";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(OrderStatus::Pending),
      "processing" => Ok(OrderStatus::Processing),
      "shipped" => Ok(OrderStatus::Shipped),
      "delivered" => Ok(OrderStatus::Delivered),
      "cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(format!("Invalid order status '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Unpaid,
  Paid,
  Refunded,
}

impl FromStr for PaymentStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "unpaid" => Ok(PaymentStatus::Unpaid),
      "paid" => Ok(PaymentStatus::Paid),
      "refunded" => Ok(PaymentStatus::Refunded),
      other => Err(format!("Invalid payment status '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_method_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
  #[default]
  Cod,
  Online,
}

impl PaymentMethod {
  /// Anything other than an explicit `"online"` means cash on delivery.
  pub fn from_request(requested: Option<&str>) -> Self {
    match requested {
      Some("online") => PaymentMethod::Online,
      _ => PaymentMethod::Cod,
    }
  }
}

/// A purchased line, frozen at order time. `product` is a weak reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product: Option<Uuid>,
  pub name: String,
  pub quantity: i32,
  pub price: Decimal,
}

impl OrderItem {
  /// `None` when price times quantity does not fit in a `Decimal`.
  pub fn line_total(&self) -> Option<Decimal> {
    self.price.checked_mul(Decimal::from(self.quantity))
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub customer_name: String,
  pub customer_email: String,
  pub customer_phone: Option<String>,
  pub address: Option<String>,
  pub items: Vec<OrderItem>,
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub payment_method: PaymentMethod,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// An order about to be stored; new orders always start pending and unpaid.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub customer_name: String,
  pub customer_email: String,
  pub customer_phone: Option<String>,
  pub address: Option<String>,
  pub items: Vec<OrderItem>,
  pub total_amount: Decimal,
  pub payment_method: PaymentMethod,
  pub notes: Option<String>,
}

/// Admin edit. Any status may follow any other.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
  pub status: Option<OrderStatus>,
  pub payment_status: Option<PaymentStatus>,
  pub notes: Option<String>,
}

/// Σ(price × quantity), rejected when it cannot be stored as an order total.
pub fn sum_items(items: &[OrderItem]) -> Result<Decimal, AppError> {
  items
    .iter()
    .try_fold(Decimal::ZERO, |acc, item| item.line_total().and_then(|line| acc.checked_add(line)))
    .filter(|total| *total <= MAX_AMOUNT)
    .ok_or_else(|| AppError::Validation(AMOUNT_TOO_LARGE_MESSAGE.to_string()))
}
