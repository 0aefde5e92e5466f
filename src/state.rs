// src/state.rs

use crate::config::AppConfig;
use crate::db::Store;
use crate::errors::AppError;
use crate::services::{ImageStore, TokenService};
use crate::workflow::WorkflowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub workflows: Arc<WorkflowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
  pub tokens: Arc<TokenService>,
  pub images: Arc<dyn ImageStore>,
}

impl AppState {
  /// Builds state over an opened store. Pipelines still need registering afterwards.
  pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>, images: Arc<dyn ImageStore>) -> Self {
    let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes(), config.jwt_ttl_hours));
    Self {
      store,
      workflows: Arc::new(WorkflowRegistry::new()),
      config,
      tokens,
      images,
    }
  }
}
