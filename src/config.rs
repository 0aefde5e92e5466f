// src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres { url: String, max_connections: u32 },
  /// In-process store; data is lost on restart.
  Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAdmin {
  pub name: String,
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store: StoreBackend,
  pub jwt_secret: String,
  pub jwt_ttl_hours: i64,
  /// Explicitly allowed CORS origins; `*` allows any origin.
  pub frontend_urls: Vec<String>,
  pub production: bool,
  pub seed_db: bool,
  pub seed_admin: SeedAdmin,
}

const DEFAULT_JWT_SECRET: &str = "dev_secret";

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any key lookup; `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
    let parse = |name: &str, raw: String| -> Result<i64> {
      raw
        .trim()
        .parse::<i64>()
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
    };

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "5000")
      .trim()
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let database_url = lookup("DATABASE_URL")
      .filter(|v| !v.trim().is_empty())
      .ok_or_else(|| AppError::Config("Missing environment variable 'DATABASE_URL'".to_string()))?;
    let store = if database_url.trim().eq_ignore_ascii_case("memory") {
      StoreBackend::Memory
    } else {
      let max_connections = parse("DB_MAX_CONNECTIONS", get_or("DB_MAX_CONNECTIONS", "10"))?;
      if max_connections < 1 {
        return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
      }
      StoreBackend::Postgres {
        url: database_url,
        max_connections: max_connections as u32,
      }
    };

    let production = get_or("APP_ENV", "development").trim().eq_ignore_ascii_case("production");

    let jwt_secret = get_or("JWT_SECRET", DEFAULT_JWT_SECRET);
    if jwt_secret.is_empty() {
      return Err(AppError::Config("JWT_SECRET must not be empty".to_string()));
    }
    if production && jwt_secret == DEFAULT_JWT_SECRET {
      tracing::warn!("JWT_SECRET is not set; production is signing tokens with the development secret.");
    }
    let jwt_ttl_hours = parse("JWT_TTL_HOURS", get_or("JWT_TTL_HOURS", "168"))?;
    if jwt_ttl_hours < 1 {
      return Err(AppError::Config("JWT_TTL_HOURS must be at least 1".to_string()));
    }

    let frontend_urls = get_or("FRONTEND_URLS", "")
      .split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_string)
      .collect();

    let seed_db = get_or("SEED_DB", "false")
      .trim()
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    let seed_admin = SeedAdmin {
      name: get_or("ADMIN_NAME", "Admin"),
      email: get_or("ADMIN_EMAIL", "admin@quickglow.local").trim().to_lowercase(),
      password: get_or("ADMIN_PASSWORD", "Admin@12345"),
    };

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      store,
      jwt_secret,
      jwt_ttl_hours,
      frontend_urls,
      production,
      seed_db,
      seed_admin,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }

  /// Whether a browser origin may call the API.
  pub fn origin_allowed(&self, origin: &str) -> bool {
    const DEV_ORIGIN_PREFIXES: [&str; 3] = ["http://localhost:", "http://127.0.0.1:", "http://0.0.0.0:"];

    let origin = origin.trim();
    let allowed_by_env = self.frontend_urls.iter().any(|u| u == "*" || u == origin);
    let allowed_by_dev_default = !self.production && DEV_ORIGIN_PREFIXES.iter().any(|p| origin.starts_with(p));
    allowed_by_env || allowed_by_dev_default
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k: &str| map.get(k).cloned()
  }

  #[test]
  fn defaults_apply_when_only_database_url_is_set() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/quickglow")])).unwrap();
    assert_eq!(cfg.bind_address(), "127.0.0.1:5000");
    assert_eq!(
      cfg.store,
      StoreBackend::Postgres {
        url: "postgres://localhost/quickglow".into(),
        max_connections: 10
      }
    );
    assert_eq!(cfg.jwt_secret, "dev_secret");
    assert_eq!(cfg.jwt_ttl_hours, 168);
    assert!(!cfg.production);
    assert!(!cfg.seed_db);
    assert_eq!(cfg.seed_admin.email, "admin@quickglow.local");
  }

  #[test]
  fn memory_backend_and_invalid_values() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "memory"), ("SEED_DB", "true")])).unwrap();
    assert_eq!(cfg.store, StoreBackend::Memory);
    assert!(cfg.seed_db);

    assert!(matches!(AppConfig::from_lookup(lookup_from(&[])), Err(AppError::Config(_))));
    assert!(matches!(
      AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "memory"), ("SERVER_PORT", "http")])),
      Err(AppError::Config(_))
    ));
    assert!(matches!(
      AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "memory"), ("JWT_TTL_HOURS", "0")])),
      Err(AppError::Config(_))
    ));
  }

  #[test]
  fn cors_origins_follow_environment() {
    let dev = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "memory"),
      ("FRONTEND_URLS", "https://shop.example.com, https://admin.example.com"),
    ]))
    .unwrap();
    assert!(dev.origin_allowed("https://admin.example.com"));
    assert!(dev.origin_allowed("http://localhost:5173"));
    assert!(!dev.origin_allowed("https://evil.example.com"));

    let prod = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "memory"), ("APP_ENV", "production")])).unwrap();
    assert!(!prod.origin_allowed("http://localhost:5173"));

    let any = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "memory"),
      ("APP_ENV", "production"),
      ("FRONTEND_URLS", "*"),
    ]))
    .unwrap();
    assert!(any.origin_allowed("https://anything.example"));
  }

  #[test]
  #[serial]
  fn from_env_reads_process_environment() {
    env::set_var("DATABASE_URL", "memory");
    env::set_var("SERVER_PORT", "6100");
    let cfg = AppConfig::from_env().unwrap();
    env::remove_var("SERVER_PORT");
    env::remove_var("DATABASE_URL");
    assert_eq!(cfg.server_port, 6100);
    assert_eq!(cfg.store, StoreBackend::Memory);
  }
}
