// tests/common/mod.rs
#![allow(dead_code, unused_macros)] // Not every test binary uses every helper

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

use quickglow_store::build_state;
use quickglow_store::config::AppConfig;
use quickglow_store::db::MemoryStore;
use quickglow_store::models::{Category, NewCategory, NewProduct, NewUser, Product, Role, User};
use quickglow_store::services::auth_service::hash_password;
use quickglow_store::services::InlineImageStore;
use quickglow_store::state::AppState;

pub const TEST_PASSWORD: &str = "secret123";

static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

pub fn test_config() -> AppConfig {
  let vars: HashMap<&str, &str> = [
    ("DATABASE_URL", "memory"),
    ("JWT_SECRET", "integration-test-secret"),
    ("JWT_TTL_HOURS", "1"),
  ]
  .into_iter()
  .collect();
  AppConfig::from_lookup(|k: &str| vars.get(k).map(|v| v.to_string())).expect("test config")
}

/// Fresh state over an empty in-memory store, with every pipeline registered.
pub fn test_state() -> AppState {
  setup_tracing();
  build_state(
    Arc::new(test_config()),
    Arc::new(MemoryStore::new()),
    Arc::new(InlineImageStore),
  )
}

pub async fn create_user(state: &AppState, name: &str, email: &str, role: Role) -> User {
  state
    .store
    .create_user(NewUser {
      name: name.to_string(),
      email: email.to_lowercase(),
      password_hash: hash_password(TEST_PASSWORD).expect("hash"),
      role,
    })
    .await
    .expect("create user")
}

pub fn token_for(state: &AppState, user: &User) -> String {
  state.tokens.issue(user.id, user.role).expect("issue token")
}

pub fn bearer(token: &str) -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", token))
}

/// Creates an admin and returns it with a valid token.
pub async fn admin_with_token(state: &AppState) -> (User, String) {
  let admin = create_user(state, "Admin", "admin@quickglow.test", Role::Admin).await;
  let token = token_for(state, &admin);
  (admin, token)
}

pub async fn create_category(state: &AppState, name: &str) -> Category {
  state
    .store
    .create_category(NewCategory {
      name: name.to_string(),
      description: None,
      is_active: true,
      icon: None,
      color: None,
    })
    .await
    .expect("create category")
}

pub async fn create_product(
  state: &AppState,
  name: &str,
  cents: i64,
  stock: i32,
  category_id: Option<Uuid>,
  is_active: bool,
) -> Product {
  state
    .store
    .create_product(NewProduct {
      name: name.to_string(),
      price: Decimal::new(cents, 2),
      stock,
      original_price: None,
      category_id,
      description: None,
      image_url: None,
      is_active,
    })
    .await
    .expect("create product")
}

pub async fn stock_of(state: &AppState, id: Uuid) -> i32 {
  state
    .store
    .find_products(&[id])
    .await
    .expect("find products")
    .first()
    .map(|p| p.stock)
    .expect("product exists")
}

/// Initializes the full route table over `$state` as an `actix_web::test` service.
macro_rules! test_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure(quickglow_store::web::configure_app_routes),
    )
    .await
  };
}

/// Money is serialized as a JSON number; compare it with a small tolerance.
pub fn assert_money(value: &serde_json::Value, expected: f64) {
  let actual = value.as_f64().unwrap_or_else(|| panic!("expected a number, got {}", value));
  assert!((actual - expected).abs() < 1e-6, "expected {}, got {}", expected, actual);
}
