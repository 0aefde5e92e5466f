// src/services/token_service.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Role;

/// Bearer token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  /// Role at issue time. Authorization re-reads the stored role instead of trusting this.
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

/// Signs and verifies HS256 tokens.
pub struct TokenService {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  validation: Validation,
  ttl: Duration,
}

impl TokenService {
  pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    Self {
      encoding_key: EncodingKey::from_secret(secret),
      decoding_key: DecodingKey::from_secret(secret),
      validation,
      ttl: Duration::hours(ttl_hours),
    }
  }

  #[instrument(name = "TokenService::issue", skip(self), err(Display))]
  pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
      sub: user_id,
      role,
      iat: now.timestamp(),
      exp: (now + self.ttl).timestamp(),
    };
    self.encode(&claims)
  }

  pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
    encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
      .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
  }

  /// Checks signature and expiry. Every failure is reported as "Invalid token".
  pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &self.decoding_key, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| {
        debug!(error = %e, "Token verification failed.");
        AppError::Unauthorized("Invalid token".to_string())
      })
  }
}
