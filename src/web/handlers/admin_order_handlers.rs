// src/web/handlers/admin_order_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{order, NewOrder, OrderChanges, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
use crate::state::AppState;
use crate::web::extractors::{parse_path_id, AdminUser};

const NOT_FOUND: &str = "Order not found";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderItemPayload {
  pub product: Option<String>,
  pub name: Option<String>,
  pub quantity: Option<i32>,
  pub price: Option<Decimal>,
}

impl AdminOrderItemPayload {
  fn into_item(self) -> Result<OrderItem, AppError> {
    let invalid = || AppError::Validation("Each item needs a name, a quantity of at least 1 and a price".to_string());
    let name = self
      .name
      .map(|n| n.trim().to_string())
      .filter(|n| !n.is_empty())
      .ok_or_else(invalid)?;
    let quantity = self.quantity.filter(|q| *q >= 1).ok_or_else(invalid)?;
    let price = self
      .price
      .filter(|p| !p.is_sign_negative() && *p <= order::MAX_AMOUNT)
      .ok_or_else(invalid)?;
    // A weak reference; unparsable ids are dropped rather than rejected.
    let product = self.product.as_deref().and_then(|p| Uuid::parse_str(p.trim()).ok());
    Ok(OrderItem {
      product,
      name,
      quantity,
      price,
    })
  }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderPayload {
  pub customer_name: Option<String>,
  pub customer_email: Option<String>,
  pub customer_phone: Option<String>,
  pub address: Option<String>,
  pub items: Option<Vec<AdminOrderItemPayload>>,
  pub total_amount: Option<Decimal>,
  pub payment_method: Option<String>,
  pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdatePayload {
  pub status: Option<String>,
  pub payment_status: Option<String>,
  pub notes: Option<String>,
}

impl OrderUpdatePayload {
  fn into_changes(self) -> Result<OrderChanges, AppError> {
    let status = self
      .status
      .as_deref()
      .map(str::parse::<OrderStatus>)
      .transpose()
      .map_err(AppError::Validation)?;
    let payment_status = self
      .payment_status
      .as_deref()
      .map(str::parse::<PaymentStatus>)
      .transpose()
      .map_err(AppError::Validation)?;
    Ok(OrderChanges {
      status,
      payment_status,
      notes: self.notes,
    })
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[instrument(name = "handler::admin_list_orders", skip_all)]
pub async fn list_orders_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.list_orders().await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::admin_get_order", skip(app_state, _admin))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = parse_path_id(&path, NOT_FOUND)?;
  let order = app_state
    .store
    .find_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

/// Manual order entry. Items and total are taken as given; no catalog pricing applies.
#[instrument(name = "handler::admin_create_order", skip_all)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  req_payload: web::Json<AdminOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let (customer_name, customer_email, raw_items) = match (
    non_blank(payload.customer_name),
    non_blank(payload.customer_email),
    payload.items.filter(|items| !items.is_empty()),
  ) {
    (Some(name), Some(email), Some(items)) => (name, email, items),
    _ => return Err(AppError::Validation("Customer and items are required".to_string())),
  };
  let items = raw_items
    .into_iter()
    .map(AdminOrderItemPayload::into_item)
    .collect::<Result<Vec<_>, _>>()?;
  let total_amount = match payload.total_amount {
    Some(total) => total,
    None => order::sum_items(&items)?,
  };
  if total_amount.is_sign_negative() && !total_amount.is_zero() {
    return Err(AppError::Validation("Total amount must not be negative".to_string()));
  }
  if total_amount > order::MAX_AMOUNT {
    return Err(AppError::Validation(order::AMOUNT_TOO_LARGE_MESSAGE.to_string()));
  }

  let created = app_state
    .store
    .create_order(NewOrder {
      customer_name,
      customer_email,
      customer_phone: non_blank(payload.customer_phone),
      address: non_blank(payload.address),
      items,
      total_amount,
      payment_method: PaymentMethod::from_request(payload.payment_method.as_deref()),
      notes: non_blank(payload.notes),
    })
    .await?;
  info!(order_id = %created.id, "Order created manually.");
  Ok(HttpResponse::Created().json(json!({ "order": created })))
}

/// Any status may follow any other; there is no transition table.
#[instrument(name = "handler::admin_update_order", skip(app_state, _admin, req_payload))]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<String>,
  req_payload: web::Json<OrderUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = parse_path_id(&path, NOT_FOUND)?;
  let changes = req_payload.into_inner().into_changes()?;
  let updated = app_state
    .store
    .update_order(order_id, changes)
    .await?
    .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
  info!(%order_id, status = ?updated.status, payment_status = ?updated.payment_status, "Order updated.");
  Ok(HttpResponse::Ok().json(json!({ "order": updated })))
}

#[instrument(name = "handler::admin_delete_order", skip(app_state, _admin))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = parse_path_id(&path, NOT_FOUND)?;
  if !app_state.store.delete_order(order_id).await? {
    return Err(AppError::NotFound(NOT_FOUND.to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_status_values_are_rejected() {
    let bad = OrderUpdatePayload {
      status: Some("lost".into()),
      ..Default::default()
    };
    assert!(matches!(bad.into_changes(), Err(AppError::Validation(_))));

    let ok = OrderUpdatePayload {
      payment_status: Some("paid".into()),
      ..Default::default()
    }
    .into_changes()
    .unwrap();
    assert_eq!(ok.status, None);
    assert_eq!(ok.payment_status, Some(PaymentStatus::Paid));
  }

  #[test]
  fn manual_items_are_validated() {
    let item = AdminOrderItemPayload {
      product: Some("legacy-id".into()),
      name: Some("Rice".into()),
      quantity: Some(2),
      price: Some(Decimal::new(450, 2)),
    }
    .into_item()
    .unwrap();
    assert_eq!(item.product, None);
    assert_eq!(item.line_total(), Some(Decimal::new(900, 2)));

    let no_qty = AdminOrderItemPayload {
      name: Some("Rice".into()),
      price: Some(Decimal::ONE),
      ..Default::default()
    };
    assert!(no_qty.into_item().is_err());
  }
}
