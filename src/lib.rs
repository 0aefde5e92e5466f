// src/lib.rs

//! QuickGlow storefront: a grocery-delivery REST backend (catalog, checkout, order
//! tracking, admin management) and the matching client-side cart and session state.

pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod web;
pub mod workflow;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Store;
use crate::services::ImageStore;
use crate::state::AppState;

/// Builds application state over an opened store and registers every pipeline.
pub fn build_state(config: Arc<AppConfig>, store: Arc<dyn Store>, images: Arc<dyn ImageStore>) -> AppState {
  let app_state = AppState::new(config, store, images);
  pipelines::register_all_pipelines(&app_state.workflows, &app_state);
  app_state
}
