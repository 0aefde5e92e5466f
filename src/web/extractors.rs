// src/web/extractors.rs

//! Request guards. `AuthenticatedUser` checks the bearer token; `AdminUser` also re-reads
//! the caller from the store so a role change applies on the very next request.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::db::UserStore;
use crate::errors::AppError;
use crate::models::{Role, User};
use crate::services::Claims;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub claims: Claims,
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
  req
    .app_data::<web::Data<AppState>>()
    .cloned()
    .ok_or_else(|| AppError::Internal("AppState is not registered with the application".to_string()))
}

/// The token part of an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
  req
    .headers()
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let state = app_state(req)?;
  let token = bearer_token(req).ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;
  let claims = state.tokens.verify(token)?;
  Ok(AuthenticatedUser {
    user_id: claims.sub,
    claims,
  })
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate(req))
  }
}

/// Loads the user behind `user_id` and checks that they currently hold `role`.
pub async fn require_role<U>(users: &U, user_id: Uuid, role: Role) -> Result<User, AppError>
where
  U: UserStore + ?Sized,
{
  let user = users
    .find_user(user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
  if user.role != role {
    warn!(%user_id, required = %role, actual = %user.role, "Role check failed.");
    return Err(AppError::Forbidden("Forbidden".to_string()));
  }
  Ok(user)
}

/// An authenticated caller whose stored role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser {
  pub user: User,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let authenticated = authenticate(req);
    let state = app_state(req);
    Box::pin(async move {
      let authenticated = authenticated?;
      let state = state?;
      let user = require_role(state.store.as_ref(), authenticated.user_id, Role::Admin).await?;
      Ok(AdminUser { user })
    })
  }
}

/// Path ids that are not UUIDs cannot name a record, so they read as "not found".
pub fn parse_path_id(raw: &str, not_found_message: &str) -> Result<Uuid, AppError> {
  Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(not_found_message.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{MemoryStore, UserStore};
  use crate::models::NewUser;
  use actix_web::test::TestRequest;

  #[test]
  fn bearer_token_requires_the_scheme() {
    let req = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
      .to_http_request();
    assert_eq!(bearer_token(&req), Some("abc.def"));

    let req = TestRequest::default()
      .insert_header((header::AUTHORIZATION, "Token abc.def"))
      .to_http_request();
    assert_eq!(bearer_token(&req), None);

    let req = TestRequest::default().to_http_request();
    assert_eq!(bearer_token(&req), None);
  }

  #[tokio::test]
  async fn role_guard_reads_the_stored_role() {
    let store = MemoryStore::new();
    let user = store
      .create_user(NewUser {
        name: "Sam".into(),
        email: "sam@example.com".into(),
        password_hash: "x".into(),
        role: Role::User,
      })
      .await
      .unwrap();

    let err = require_role(&store, user.id, Role::Admin).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(require_role(&store, user.id, Role::User).await.is_ok());

    let missing = require_role(&store, Uuid::new_v4(), Role::Admin).await.unwrap_err();
    assert_eq!(missing.client_message(), "User not found");
  }

  #[test]
  fn malformed_ids_are_not_found() {
    let err = parse_path_id("abc", "Order not found").unwrap_err();
    assert!(matches!(err, AppError::NotFound(m) if m == "Order not found"));
    assert!(parse_path_id(&Uuid::new_v4().to_string(), "x").is_ok());
  }
}
