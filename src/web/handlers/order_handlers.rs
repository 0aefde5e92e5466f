// src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::CheckoutRequest;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::workflow::{ContextData, PipelineResult};

#[instrument(name = "handler::checkout", skip(app_state, req_payload))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(CheckoutCtxData::new(app_state.get_ref().clone(), req_payload.into_inner()));

  match app_state.workflows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let guard = ctx_data.read();
      let order = guard.order.clone().ok_or_else(|| {
        warn!("Checkout pipeline completed but no order was recorded.");
        AppError::Internal("Checkout completed without an order.".to_string())
      })?;
      info!(order_id = %order.id, stock_decremented = guard.stock_decremented, "Checkout completed.");
      Ok(HttpResponse::Created().json(json!({ "order": order })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Checkout pipeline was stopped by a handler.");
      Err(AppError::Internal("Checkout process was halted.".to_string()))
    }
    Err(app_err) => {
      warn!("Checkout pipeline failed: {}", app_err);
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::my_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn my_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let user = app_state
    .store
    .find_user(auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
  let orders = app_state.store.list_orders_by_email(&user.email).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}
