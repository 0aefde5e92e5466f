// src/web/handlers/admin_category_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{CategoryChanges, NewCategory};
use crate::state::AppState;
use crate::web::extractors::{parse_path_id, AdminUser};

const NOT_FOUND: &str = "Category not found";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
  pub name: Option<String>,
  pub description: Option<String>,
  pub is_active: Option<bool>,
  pub icon: Option<String>,
  pub color: Option<String>,
}

fn trimmed_name(name: Option<String>) -> Result<Option<String>, AppError> {
  match name.map(|n| n.trim().to_string()) {
    Some(n) if n.is_empty() => Err(AppError::Validation("Name is required".to_string())),
    other => Ok(other),
  }
}

#[instrument(name = "handler::admin_list_categories", skip_all)]
pub async fn list_categories_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let categories = app_state.store.list_categories(false).await?;
  Ok(HttpResponse::Ok().json(json!({ "categories": categories })))
}

#[instrument(name = "handler::admin_create_category", skip_all)]
pub async fn create_category_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  req_payload: web::Json<CategoryPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let name = trimmed_name(payload.name)?.ok_or_else(|| AppError::Validation("Name is required".to_string()))?;

  if app_state.store.find_category_by_name(&name).await?.is_some() {
    return Err(AppError::Conflict("Category name already exists".to_string()));
  }

  let category = app_state
    .store
    .create_category(NewCategory {
      name,
      description: payload.description,
      is_active: payload.is_active.unwrap_or(true),
      icon: payload.icon,
      color: payload.color,
    })
    .await?;
  info!(category_id = %category.id, "Category created.");
  Ok(HttpResponse::Created().json(json!({ "category": category })))
}

#[instrument(name = "handler::admin_update_category", skip(app_state, _admin, req_payload))]
pub async fn update_category_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<String>,
  req_payload: web::Json<CategoryPayload>,
) -> Result<HttpResponse, AppError> {
  let category_id = parse_path_id(&path, NOT_FOUND)?;
  let payload = req_payload.into_inner();
  let changes = CategoryChanges {
    name: trimmed_name(payload.name)?,
    description: payload.description,
    is_active: payload.is_active,
    icon: payload.icon,
    color: payload.color,
  };

  let category = app_state
    .store
    .update_category(category_id, changes)
    .await?
    .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "category": category })))
}

#[instrument(name = "handler::admin_delete_category", skip(app_state, _admin))]
pub async fn delete_category_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let category_id = parse_path_id(&path, NOT_FOUND)?;
  if !app_state.store.delete_category(category_id).await? {
    return Err(AppError::NotFound(NOT_FOUND.to_string()));
  }
  info!(%category_id, "Category deleted.");
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
