// src/pipelines/contexts.rs

//! Data structs threaded through the application's pipelines.
//! Handlers receive these wrapped in `ContextData`.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CartLine, CheckoutRequest, Order, OrderItem, Product, User};
use crate::state::AppState;
use crate::workflow::ContextData;

pub const QUANTITY_TOO_LARGE_MESSAGE: &str = "Requested quantity is too large";

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub request: CheckoutRequest,
  /// Set by `validate_checkout_input`.
  pub lines: Vec<CartLine>,
  /// Referenced products keyed by id, set by `resolve_cart_products`.
  pub products: HashMap<Uuid, Product>,
  pub items: Vec<OrderItem>,
  pub total_amount: Decimal,
  pub order: Option<Order>,
  pub stock_decremented: bool,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, request: CheckoutRequest) -> Self {
    Self {
      app_state,
      request,
      lines: Vec::new(),
      products: HashMap::new(),
      items: Vec::new(),
      total_amount: Decimal::ZERO,
      order: None,
      stock_decremented: false,
    }
  }

  /// Requested quantity per product, summed over duplicate lines, in first-seen order.
  pub fn requested_quantities(&self) -> Result<Vec<(Uuid, i32)>, AppError> {
    let mut totals: Vec<(Uuid, i32)> = Vec::new();
    for line in &self.lines {
      if let CartLine::Product { product, quantity } = line {
        match totals.iter_mut().find(|(id, _)| id == product) {
          Some((_, total)) => {
            *total = total
              .checked_add(*quantity)
              .ok_or_else(|| AppError::Validation(QUANTITY_TOO_LARGE_MESSAGE.to_string()))?;
          }
          None => totals.push((*product, *quantity)),
        }
      }
    }
    Ok(totals)
  }
}

/// Skip condition shared by the product-only checkout steps.
pub fn is_ad_hoc_cart(ctx_data: ContextData<CheckoutCtxData>) -> bool {
  ctx_data
    .read()
    .lines
    .iter()
    .any(|line| matches!(line, CartLine::AdHoc { .. }))
}

#[derive(Clone)]
pub struct RegisterCtxData {
  pub app_state: AppState,
  pub name: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
  pub created_user: Option<User>,
  pub token: Option<String>,
}

#[derive(Clone)]
pub struct LoginCtxData {
  pub app_state: AppState,
  pub email: Option<String>,
  pub password: Option<String>,
  pub user: Option<User>,
  pub token: Option<String>,
}
