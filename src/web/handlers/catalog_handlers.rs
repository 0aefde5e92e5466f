// src/web/handlers/catalog_handlers.rs

//! Public catalog reads. Only active records are ever served here.

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::parse_path_id;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.store.list_products(true).await?;
  info!("Fetched {} active products.", products.len());
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_str()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = parse_path_id(&path, "Product not found")?;

  // Inactive products exist but are not shown publicly.
  match app_state.store.find_product_listing(product_id).await? {
    Some(listing) if listing.product.is_active => Ok(HttpResponse::Ok().json(json!({ "product": listing }))),
    _ => {
      warn!("Product {} not found or inactive.", product_id);
      Err(AppError::NotFound("Product not found".to_string()))
    }
  }
}

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = app_state.store.list_categories(true).await?;
  Ok(HttpResponse::Ok().json(json!({ "categories": categories })))
}
