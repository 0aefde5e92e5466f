// src/web/handlers/admin_product_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewProduct, ProductChanges};
use crate::services::image_store::resolve_image_url;
use crate::state::AppState;
use crate::web::extractors::{parse_path_id, AdminUser};

const NOT_FOUND: &str = "Product not found";

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
  pub name: Option<String>,
  pub price: Option<Decimal>,
  pub original_price: Option<Decimal>,
  pub stock: Option<i32>,
  pub category: Option<String>,
  pub description: Option<String>,
  pub image_url: Option<String>,
  /// Inline image content; takes precedence over `imageUrl`.
  pub image_data: Option<String>,
  pub is_active: Option<bool>,
}

impl ProductPayload {
  fn check_amounts(&self) -> Result<(), AppError> {
    let negative_money = [self.price, self.original_price]
      .iter()
      .flatten()
      .any(|v| v.is_sign_negative() && !v.is_zero());
    if negative_money || self.stock.is_some_and(|s| s < 0) {
      return Err(AppError::Validation(
        "Price, original price and stock must not be negative".to_string(),
      ));
    }
    Ok(())
  }

  /// An empty string clears nothing and means "no category given".
  fn category_id(&self) -> Result<Option<Uuid>, AppError> {
    match self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
      Some(raw) => Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| AppError::Validation("Invalid category".to_string())),
      None => Ok(None),
    }
  }

  fn name(&self) -> Option<String> {
    self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
  }
}

#[instrument(name = "handler::admin_list_products", skip_all)]
pub async fn list_products_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let products = app_state.store.list_products(false).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::admin_create_product", skip_all)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  req_payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let (name, price, stock) = match (payload.name(), payload.price, payload.stock) {
    (Some(name), Some(price), Some(stock)) => (name, price, stock),
    _ => return Err(AppError::Validation("Name, price and stock are required".to_string())),
  };
  payload.check_amounts()?;
  let category_id = payload.category_id()?;
  let image_url = resolve_image_url(
    app_state.images.as_ref(),
    payload.image_url.clone(),
    payload.image_data.as_deref(),
  )
  .await?;

  let product = app_state
    .store
    .create_product(NewProduct {
      name,
      price,
      stock,
      original_price: payload.original_price,
      category_id,
      description: payload.description,
      image_url,
      is_active: payload.is_active.unwrap_or(true),
    })
    .await?;
  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(json!({ "product": product })))
}

#[instrument(name = "handler::admin_update_product", skip(app_state, _admin, req_payload))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<String>,
  req_payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  let product_id = parse_path_id(&path, NOT_FOUND)?;
  let payload = req_payload.into_inner();
  if payload.name.is_some() && payload.name().is_none() {
    return Err(AppError::Validation("Name must not be empty".to_string()));
  }
  payload.check_amounts()?;
  let category_id = payload.category_id()?;
  let image_url = resolve_image_url(
    app_state.images.as_ref(),
    payload.image_url.clone(),
    payload.image_data.as_deref(),
  )
  .await?;

  let changes = ProductChanges {
    name: payload.name(),
    price: payload.price,
    stock: payload.stock,
    original_price: payload.original_price,
    category_id,
    description: payload.description,
    image_url,
    is_active: payload.is_active,
  };
  let product = app_state
    .store
    .update_product(product_id, changes)
    .await?
    .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::admin_delete_product", skip(app_state, _admin))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = parse_path_id(&path, NOT_FOUND)?;
  if !app_state.store.delete_product(product_id).await? {
    return Err(AppError::NotFound(NOT_FOUND.to_string()));
  }
  info!(%product_id, "Product deleted.");
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn amounts_must_not_be_negative() {
    let ok = ProductPayload {
      price: Some(Decimal::ZERO),
      stock: Some(0),
      ..Default::default()
    };
    assert!(ok.check_amounts().is_ok());

    let bad_stock = ProductPayload {
      stock: Some(-1),
      ..Default::default()
    };
    assert!(bad_stock.check_amounts().is_err());

    let bad_price = ProductPayload {
      original_price: Some(Decimal::new(-5, 1)),
      ..Default::default()
    };
    assert!(bad_price.check_amounts().is_err());
  }

  #[test]
  fn category_reference_parsing() {
    let blank = ProductPayload {
      category: Some("  ".into()),
      ..Default::default()
    };
    assert_eq!(blank.category_id().unwrap(), None);

    let bad = ProductPayload {
      category: Some("dairy".into()),
      ..Default::default()
    };
    assert!(matches!(bad.category_id(), Err(AppError::Validation(_))));
  }
}
