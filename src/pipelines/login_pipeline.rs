// src/pipelines/login_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::LoginCtxData;
use crate::services::auth_service;
use crate::state::AppState;
use crate::workflow::{ContextData, Pipeline, PipelineControl, WorkflowRegistry};
use std::sync::Arc;
use tracing::{info, warn};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub fn build_login_pipeline() -> Pipeline<LoginCtxData, AppError> {
  let mut p = Pipeline::<LoginCtxData, AppError>::new(&[
    ("find_account", false, None),
    ("verify_credentials", false, None),
    ("issue_token", false, None),
  ]);

  p.on_root("find_account", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (store, email) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.email.as_deref().map(str::trim).unwrap_or_default().to_lowercase(),
        )
      };
      if email.is_empty() {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
      }

      let user = store.find_user_by_email(&email).await?.ok_or_else(|| {
        warn!("Login attempt for unknown email.");
        AppError::Unauthorized(INVALID_CREDENTIALS.to_string())
      })?;
      ctx_data.write().user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("verify_credentials", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let password = guard.password.take().unwrap_or_default();
      let stored_hash = guard
        .user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_default();
      if !auth_service::verify_password(&stored_hash, &password)? {
        warn!("Login attempt with a wrong password.");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("issue_token", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let (user_id, role) = guard
        .user
        .as_ref()
        .map(|u| (u.id, u.role))
        .ok_or_else(|| AppError::Internal("Login reached token issue without a user".to_string()))?;
      guard.token = Some(guard.app_state.tokens.issue(user_id, role)?);
      info!(%user_id, "Login successful.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}

pub fn register_signin_pipeline(registry: &Arc<WorkflowRegistry<AppError>>, _app_state: &AppState) {
  registry.register_pipeline(build_login_pipeline());
}
