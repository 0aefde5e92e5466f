// tests/auth_tests.rs
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use chrono::Utc;
use common::*;
use quickglow_store::models::Role;
use quickglow_store::services::Claims;
use serde_json::{json, Value};

#[actix_web::test]
async fn test_register_then_login_and_fetch_profile() {
  let state = test_state();
  let app = test_app!(state);

  let req = TestRequest::post()
    .uri("/api/auth/register")
    .set_json(json!({ "name": " Sam ", "email": "Sam@Example.com", "password": "hunter22" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
  assert_eq!(body["user"]["name"], "Sam");
  assert_eq!(body["user"]["email"], "sam@example.com");
  assert_eq!(body["user"]["role"], "user");
  assert!(body["user"].get("passwordHash").is_none());

  let req = TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({ "email": "SAM@example.com", "password": "hunter22" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  let token = body["token"].as_str().unwrap().to_string();

  let req = TestRequest::get()
    .uri("/api/users/me")
    .insert_header(bearer(&token))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["user"]["email"], "sam@example.com");
}

#[actix_web::test]
async fn test_register_rejects_duplicates_and_short_passwords() {
  let state = test_state();
  create_user(&state, "Existing", "taken@example.com", Role::User).await;
  let app = test_app!(state);

  let req = TestRequest::post()
    .uri("/api/auth/register")
    .set_json(json!({ "name": "Other", "email": "TAKEN@example.com", "password": "hunter22" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Email already registered");

  let req = TestRequest::post()
    .uri("/api/auth/register")
    .set_json(json!({ "name": "Short", "email": "short@example.com", "password": "abc" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Password must be at least 6 characters");

  let req = TestRequest::post()
    .uri("/api/auth/register")
    .set_json(json!({ "email": "noname@example.com", "password": "hunter22" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_failures_are_indistinguishable() {
  let state = test_state();
  create_user(&state, "Jo", "jo@example.com", Role::User).await;
  let app = test_app!(state);

  for (email, password) in [("jo@example.com", "wrong-password"), ("nobody@example.com", TEST_PASSWORD)] {
    let req = TestRequest::post()
      .uri("/api/auth/login")
      .set_json(json!({ "email": email, "password": password }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");
  }
}

#[actix_web::test]
async fn test_missing_and_invalid_tokens() {
  let state = test_state();
  let user = create_user(&state, "Jo", "jo@example.com", Role::User).await;
  let app = test_app!(state);

  let req = TestRequest::get().uri("/api/users/me").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Missing token");

  let mut tampered = token_for(&state, &user);
  tampered.push('x');
  let now = Utc::now().timestamp();
  let expired = state
    .tokens
    .encode(&Claims {
      sub: user.id,
      role: user.role,
      iat: now - 7200,
      exp: now - 3600,
    })
    .unwrap();

  for token in [tampered, expired, "not-a-jwt".to_string()] {
    let req = TestRequest::get()
      .uri("/api/users/me")
      .insert_header(bearer(&token))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid token");
  }
}

#[actix_web::test]
async fn test_admin_guard_uses_stored_role() {
  let state = test_state();
  let user = create_user(&state, "Jo", "jo@example.com", Role::User).await;
  let (_admin, admin_token) = admin_with_token(&state).await;
  let app = test_app!(state);

  let req = TestRequest::get()
    .uri("/api/users/admin/stats")
    .insert_header(bearer(&token_for(&state, &user)))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Forbidden");

  // A token claiming admin does not help an account stored as a plain user.
  let forged = state.tokens.issue(user.id, Role::Admin).unwrap();
  let req = TestRequest::get()
    .uri("/api/users/admin/stats")
    .insert_header(bearer(&forged))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);

  let req = TestRequest::get()
    .uri("/api/users/admin/stats")
    .insert_header(bearer(&admin_token))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["stats"]["users"], 2);
  assert_eq!(body["stats"]["admins"], 1);
}
