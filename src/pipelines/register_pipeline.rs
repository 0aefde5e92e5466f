// src/pipelines/register_pipeline.rs

use crate::errors::AppError;
use crate::models::{NewUser, Role};
use crate::pipelines::contexts::RegisterCtxData;
use crate::services::auth_service;
use crate::state::AppState;
use crate::workflow::{ContextData, Pipeline, PipelineControl, WorkflowRegistry};
use std::sync::Arc;
use tracing::info;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn build_register_pipeline() -> Pipeline<RegisterCtxData, AppError> {
  let mut p = Pipeline::<RegisterCtxData, AppError>::new(&[
    ("validate_registration", false, None),
    ("create_account", false, None),
    ("issue_token", false, None),
  ]);

  p.on_root("validate_registration", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let name = guard.name.as_deref().map(str::trim).unwrap_or_default().to_string();
      let email = guard.email.as_deref().map(str::trim).unwrap_or_default().to_lowercase();
      let password = guard.password.clone().unwrap_or_default();

      if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Name, email and password are required".to_string()));
      }
      if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
          "Password must be at least {} characters",
          MIN_PASSWORD_LEN
        )));
      }
      guard.name = Some(name);
      guard.email = Some(email);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("create_account", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let (store, name, email, password) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.name.clone().unwrap_or_default(),
          guard.email.clone().unwrap_or_default(),
          guard.password.clone().unwrap_or_default(),
        )
      };

      if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
      }
      let password_hash = auth_service::hash_password(&password)?;
      // The unique index still guards against a concurrent registration.
      let user = store
        .create_user(NewUser {
          name,
          email,
          password_hash,
          role: Role::User,
        })
        .await?;
      info!(user_id = %user.id, "Account created.");

      let mut guard = ctx_data.write();
      guard.password = None;
      guard.created_user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("issue_token", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let (user_id, role) = guard
        .created_user
        .as_ref()
        .map(|u| (u.id, u.role))
        .ok_or_else(|| AppError::Internal("Registration reached token issue without a user".to_string()))?;
      guard.token = Some(guard.app_state.tokens.issue(user_id, role)?);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}

pub fn register_signup_pipeline(registry: &Arc<WorkflowRegistry<AppError>>, _app_state: &AppState) {
  registry.register_pipeline(build_register_pipeline());
}
