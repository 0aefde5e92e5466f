// src/models/checkout.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Body of `POST /api/orders/checkout`. Every field is optional on the wire so that
/// missing values surface as validation errors instead of JSON parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
  pub customer_name: Option<String>,
  pub customer_email: Option<String>,
  pub customer_phone: Option<String>,
  pub address: Option<String>,
  pub notes: Option<String>,
  pub payment_method: Option<String>,
  pub items: Option<Vec<CheckoutItemPayload>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemPayload {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<Decimal>,
  pub quantity: Option<i32>,
}

impl CheckoutItemPayload {
  fn product_ref(&self) -> Option<&str> {
    self.product.as_deref().map(str::trim).filter(|p| !p.is_empty())
  }
}

/// One validated cart line. A cart is either all `Product` lines or all `AdHoc` lines.
#[derive(Debug, Clone, PartialEq)]
pub enum CartLine {
  Product { product: Uuid, quantity: i32 },
  AdHoc { name: String, price: Decimal, quantity: i32 },
}

impl CartLine {
  pub fn quantity(&self) -> i32 {
    match self {
      CartLine::Product { quantity, .. } | CartLine::AdHoc { quantity, .. } => *quantity,
    }
  }

  /// Classifies raw request items. Product mode applies only when every item carries a
  /// product reference; otherwise every item is read as a free-form name/price pair.
  pub fn classify(items: &[CheckoutItemPayload]) -> Result<Vec<CartLine>, AppError> {
    let product_mode = items.iter().all(|item| item.product_ref().is_some());

    items
      .iter()
      .map(|item| {
        let quantity = match item.quantity {
          Some(q) if q >= 1 => q,
          _ => return Err(AppError::Validation("Item quantity must be at least 1".to_string())),
        };

        if product_mode {
          let raw = item.product_ref().unwrap_or_default();
          let product = Uuid::parse_str(raw)
            .map_err(|_| AppError::Validation("One or more products were not found".to_string()))?;
          return Ok(CartLine::Product { product, quantity });
        }

        let name = item.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
          return Err(AppError::Validation("Item name is required".to_string()));
        }
        let price = match item.price {
          Some(p) if !p.is_sign_negative() => p,
          _ => return Err(AppError::Validation("Item price must be zero or more".to_string())),
        };
        Ok(CartLine::AdHoc {
          name: name.to_string(),
          price,
          quantity,
        })
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product_item(id: &str, quantity: i32) -> CheckoutItemPayload {
    CheckoutItemPayload {
      product: Some(id.to_string()),
      quantity: Some(quantity),
      ..Default::default()
    }
  }

  fn ad_hoc_item(name: &str, price: i64, quantity: i32) -> CheckoutItemPayload {
    CheckoutItemPayload {
      name: Some(name.to_string()),
      price: Some(Decimal::new(price, 2)),
      quantity: Some(quantity),
      ..Default::default()
    }
  }

  #[test]
  fn all_referenced_items_become_product_lines() {
    let id = Uuid::new_v4();
    let mut item = product_item(&id.to_string(), 2);
    item.price = Some(Decimal::new(1, 2));
    let lines = CartLine::classify(&[item]).unwrap();
    assert_eq!(lines, vec![CartLine::Product { product: id, quantity: 2 }]);
  }

  #[test]
  fn mixed_carts_fall_back_to_ad_hoc_lines() {
    let mut referenced = product_item(&Uuid::new_v4().to_string(), 1);
    referenced.name = Some("Eggs".into());
    referenced.price = Some(Decimal::new(399, 2));
    let lines = CartLine::classify(&[referenced, ad_hoc_item("Bread", 250, 2)]).unwrap();
    assert!(lines.iter().all(|l| matches!(l, CartLine::AdHoc { .. })));
    assert_eq!(lines[1].quantity(), 2);
  }

  #[test]
  fn blank_product_reference_counts_as_missing() {
    let mut blank = product_item("   ", 1);
    blank.name = Some("Tea".into());
    blank.price = Some(Decimal::new(100, 2));
    let lines = CartLine::classify(&[blank]).unwrap();
    assert!(matches!(lines[0], CartLine::AdHoc { .. }));
  }

  #[test]
  fn bad_lines_are_rejected() {
    assert!(CartLine::classify(&[product_item(&Uuid::new_v4().to_string(), 0)]).is_err());
    assert!(CartLine::classify(&[ad_hoc_item("", 100, 1)]).is_err());
    assert!(CartLine::classify(&[ad_hoc_item("Jam", -1, 1)]).is_err());

    let err = CartLine::classify(&[product_item("not-a-uuid", 1)]).unwrap_err();
    assert_eq!(err.client_message(), "One or more products were not found");
  }
}
