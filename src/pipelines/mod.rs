// src/pipelines/mod.rs

//! Defines and registers the workflow pipelines used by the storefront.

use crate::errors::AppError;
use crate::state::AppState;
use crate::workflow::WorkflowRegistry;
use std::sync::Arc;

pub mod contexts;

pub mod checkout_pipeline;
pub mod login_pipeline;
pub mod register_pipeline;

/// Registers every pipeline with `registry`. Called once at startup.
pub fn register_all_pipelines(registry: &Arc<WorkflowRegistry<AppError>>, app_state: &AppState) {
  tracing::info!("Registering workflow pipelines...");

  register_pipeline::register_signup_pipeline(registry, app_state);
  login_pipeline::register_signin_pipeline(registry, app_state);
  checkout_pipeline::register_checkout_pipeline(registry, app_state);

  tracing::info!("All application pipelines registered.");
}
