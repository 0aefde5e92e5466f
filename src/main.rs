// src/main.rs

use actix_cors::Cors;
use actix_web::{http::header, web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use quickglow_store::config::AppConfig;
use quickglow_store::services::InlineImageStore;
use quickglow_store::{build_state, db, web};

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let json_output = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  if json_output {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing();
  tracing::info!("Starting storefront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(e).context("loading configuration");
    }
  };

  let store = match db::connect(&app_config.store).await {
    Ok(store) => store,
    Err(e) => {
      tracing::error!(error = %e, "Failed to open the store.");
      return Err(e).context("opening the store");
    }
  };

  if app_config.seed_db {
    db::seed::seed_store(store.as_ref(), &app_config.seed_admin)
      .await
      .context("seeding the store")?;
  }

  let app_state = build_state(app_config.clone(), store, Arc::new(InlineImageStore));
  tracing::info!("Workflow pipelines registered.");

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  let cors_config = app_config.clone();
  HttpServer::new(move || {
    let origin_config = cors_config.clone();
    let cors = Cors::default()
      .allowed_origin_fn(move |origin, _req_head| {
        origin
          .to_str()
          .map(|o| origin_config.origin_allowed(o))
          .unwrap_or(false)
      })
      .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
      .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
      .supports_credentials()
      .max_age(3600);

    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(cors)
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await
  .context("running the HTTP server")
}
