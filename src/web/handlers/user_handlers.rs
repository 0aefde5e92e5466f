// src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::models::{PublicUser, Role};
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser};

#[instrument(name = "handler::me", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn me_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let user = app_state
    .store
    .find_user(auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "user": PublicUser::from(&user) })))
}

#[instrument(name = "handler::admin_stats", skip_all)]
pub async fn admin_stats_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, AppError> {
  let users = app_state.store.count_users(None).await?;
  let admins = app_state.store.count_users(Some(Role::Admin)).await?;
  Ok(HttpResponse::Ok().json(json!({ "stats": { "users": users, "admins": admins } })))
}
