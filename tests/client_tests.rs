// tests/client_tests.rs
mod common;

use actix_web::{dev::ServerHandle, web, App, HttpServer};
use common::*;
use reqwest::StatusCode;
use rust_decimal::Decimal;

use quickglow_store::client::{Cart, CatalogFilter, ClientError, CustomerDetails, Session, StorefrontClient};
use quickglow_store::state::AppState;
use quickglow_store::web::configure_app_routes;

/// Serves the full API on an ephemeral local port.
fn spawn_server(state: AppState) -> (String, ServerHandle) {
  let server = HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(state.clone()))
      .configure(configure_app_routes)
  })
  .workers(1)
  .bind(("127.0.0.1", 0))
  .expect("bind ephemeral port");
  let addr = server.addrs()[0];
  let running = server.run();
  let handle = running.handle();
  actix_web::rt::spawn(running);
  (format!("http://{}", addr), handle)
}

#[actix_web::test]
async fn test_client_shopping_session() {
  let state = test_state();
  let pantry = create_category(&state, "Pantry").await;
  let oats = create_product(&state, "Rolled Oats", 325, 20, Some(pantry.id), true).await;
  create_product(&state, "Honey", 799, 4, Some(pantry.id), true).await;
  let (base_url, handle) = spawn_server(state.clone());
  let client = StorefrontClient::new(&base_url);

  let health = client.health().await.unwrap();
  assert_eq!(health.status, "ok");
  assert!(health.db_connected);

  let mut session = Session::new();
  let user = client
    .register(&mut session, "Riley", "riley@example.com", "porridge")
    .await
    .unwrap();
  assert!(session.is_authenticated());
  assert!(!session.is_admin());
  assert_eq!(user.email, "riley@example.com");

  let products = client.products().await.unwrap();
  assert_eq!(products.len(), 2);
  let filter = CatalogFilter {
    search: "oats".into(),
    ..Default::default()
  };
  let found = filter.apply(&products);
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].product.id, oats.id);

  let mut cart = Cart::new();
  cart.add(&found[0].product);
  cart.add(&found[0].product);
  cart.add(&found[0].product);
  assert_eq!(cart.total_price(), Decimal::new(975, 2));

  let details = CustomerDetails {
    name: "Riley".into(),
    email: "riley@example.com".into(),
    address: Some("22 Oak Lane".into()),
    ..Default::default()
  };
  let order = client.checkout(&mut cart, &details).await.unwrap();
  assert!(cart.is_empty());
  assert_eq!(order.total_amount, Decimal::new(975, 2));
  assert_eq!(stock_of(&state, oats.id).await, 17);

  assert!(matches!(client.checkout(&mut cart, &details).await, Err(ClientError::EmptyCart)));

  let orders = client.my_orders(&session).await.unwrap();
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0].id, order.id);

  let me = client.me(&mut session).await.unwrap();
  assert_eq!(me.name, "Riley");

  handle.stop(true).await;
}

#[actix_web::test]
async fn test_client_surfaces_api_errors() {
  let state = test_state();
  let honey = create_product(&state, "Honey", 799, 1, None, true).await;
  let (base_url, handle) = spawn_server(state);
  let client = StorefrontClient::new(&base_url);

  let mut session = Session::new();
  let err = client
    .login(&mut session, "ghost@example.com", "whatever")
    .await
    .unwrap_err();
  assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
  assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Invalid credentials"));
  assert!(!session.is_authenticated());

  // A stale token ends the session on the next profile refresh.
  let mut stale = Session::with_token("expired.or.forged");
  let err = client.me(&mut stale).await.unwrap_err();
  assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
  assert!(!stale.is_authenticated());

  let mut cart = Cart::new();
  cart.add(&honey);
  cart.set_quantity(honey.id, 5);
  let details = CustomerDetails {
    name: "Sam".into(),
    email: "sam@example.com".into(),
    ..Default::default()
  };
  let err = client.checkout(&mut cart, &details).await.unwrap_err();
  assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
  assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Insufficient stock for Honey. Available: 1"));
  assert_eq!(cart.quantity_of(honey.id), 5);

  assert!(matches!(client.my_orders(&Session::new()).await, Err(ClientError::NotAuthenticated)));

  handle.stop(true).await;
}
