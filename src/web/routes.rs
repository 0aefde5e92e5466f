// src/web/routes.rs

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{
  admin_category_handlers, admin_order_handlers, admin_product_handlers, auth_handlers, catalog_handlers,
  order_handlers, user_handlers,
};

/// Inline product images arrive in JSON bodies.
pub const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let db_connected = app_state.store.ping().await;
  HttpResponse::Ok().json(json!({ "status": "ok", "dbConnected": db_connected }))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let message = match &err {
    JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => "Request body is too large",
    JsonPayloadError::ContentType => "Expected a JSON request body",
    _ => "Malformed JSON request body",
  };
  tracing::debug!(error = %err, "Rejected JSON payload.");
  AppError::Validation(message.to_string()).into()
}

pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default()
    .limit(JSON_BODY_LIMIT)
    .error_handler(json_error_handler)
}

/// Registers every route under `/api` together with the JSON body settings.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.app_data(json_config()).service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler)),
      )
      .service(
        web::scope("/users")
          .route("/me", web::get().to(user_handlers::me_handler))
          .route("/admin/stats", web::get().to(user_handlers::admin_stats_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(catalog_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(catalog_handlers::get_product_handler)),
      )
      .route("/categories", web::get().to(catalog_handlers::list_categories_handler))
      .service(
        web::scope("/orders")
          .route("/checkout", web::post().to(order_handlers::checkout_handler))
          .route("/my", web::get().to(order_handlers::my_orders_handler)),
      )
      .service(
        web::scope("/admin")
          .service(
            web::scope("/categories")
              .route("", web::get().to(admin_category_handlers::list_categories_handler))
              .route("", web::post().to(admin_category_handlers::create_category_handler))
              .route("/{category_id}", web::put().to(admin_category_handlers::update_category_handler))
              .route("/{category_id}", web::delete().to(admin_category_handlers::delete_category_handler)),
          )
          .service(
            web::scope("/products")
              .route("", web::get().to(admin_product_handlers::list_products_handler))
              .route("", web::post().to(admin_product_handlers::create_product_handler))
              .route("/{product_id}", web::put().to(admin_product_handlers::update_product_handler))
              .route("/{product_id}", web::delete().to(admin_product_handlers::delete_product_handler)),
          )
          .service(
            web::scope("/orders")
              .route("", web::get().to(admin_order_handlers::list_orders_handler))
              .route("", web::post().to(admin_order_handlers::create_order_handler))
              .route("/{order_id}", web::get().to(admin_order_handlers::get_order_handler))
              .route("/{order_id}", web::put().to(admin_order_handlers::update_order_handler))
              .route("/{order_id}", web::delete().to(admin_order_handlers::delete_order_handler)),
          ),
      ),
  );
}
