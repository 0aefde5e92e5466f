// src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::PublicUser;
use crate::pipelines::contexts::{LoginCtxData, RegisterCtxData};
use crate::state::AppState;
use crate::workflow::{ContextData, PipelineResult};

// --- Request DTOs ---
#[derive(Deserialize)]
pub struct RegisterRequestPayload {
  pub name: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequestPayload {
  pub email: Option<String>,
  pub password: Option<String>,
}

#[instrument(name = "handler::register", skip(app_state, req_payload))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(RegisterCtxData {
    app_state: app_state.get_ref().clone(),
    name: payload.name,
    email: payload.email,
    password: payload.password,
    created_user: None,
    token: None,
  });

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      let (user, token) = guard
        .created_user
        .as_ref()
        .zip(guard.token.clone())
        .ok_or_else(|| AppError::Internal("Registration completed without a user or token.".to_string()))?;
      info!(user_id = %user.id, "Registration successful.");
      Ok(HttpResponse::Created().json(json!({
          "token": token,
          "user": PublicUser::from(user),
      })))
    }
    PipelineResult::Stopped => {
      warn!("Registration pipeline was stopped by a handler.");
      Err(AppError::Internal("Registration process was halted by an internal step.".to_string()))
    }
  }
}

#[instrument(name = "handler::login", skip(app_state, req_payload))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(LoginCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    user: None,
    token: None,
  });

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      let (user, token) = guard
        .user
        .as_ref()
        .zip(guard.token.clone())
        .ok_or_else(|| AppError::Internal("Login completed without a user or token.".to_string()))?;
      Ok(HttpResponse::Ok().json(json!({
          "token": token,
          "user": PublicUser::from(user),
      })))
    }
    PipelineResult::Stopped => {
      warn!("Login pipeline was stopped by a handler.");
      Err(AppError::Internal("Authentication process was unexpectedly halted.".to_string()))
    }
  }
}
