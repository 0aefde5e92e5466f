// src/client/api.rs

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::cart::Cart;
use super::session::{AuthResponse, Session};
use crate::models::{Category, CheckoutRequest, Order, ProductListing, PublicUser};

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("HTTP transport error: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with an error status; `message` is its `message` field.
  #[error("API error ({status}): {message}")]
  Api { status: StatusCode, message: String },

  #[error("Not signed in")]
  NotAuthenticated,

  #[error("Cart is empty")]
  EmptyCart,
}

impl ClientError {
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      ClientError::Api { status, .. } => Some(*status),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
  pub status: String,
  pub db_connected: bool,
}

/// Contact and delivery details entered at checkout.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerDetails {
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub notes: Option<String>,
  pub pay_online: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: Option<String>,
}

#[derive(Deserialize)]
struct UserEnvelope {
  user: PublicUser,
}

#[derive(Deserialize)]
struct ProductsEnvelope {
  products: Vec<ProductListing>,
}

#[derive(Deserialize)]
struct ProductEnvelope {
  product: ProductListing,
}

#[derive(Deserialize)]
struct CategoriesEnvelope {
  categories: Vec<Category>,
}

#[derive(Deserialize)]
struct OrderEnvelope {
  order: Order,
}

#[derive(Deserialize)]
struct OrdersEnvelope {
  orders: Vec<Order>,
}

/// Typed client for the storefront REST API.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
  http: reqwest::Client,
  api_base: String,
}

impl StorefrontClient {
  /// `base_url` is the server root, e.g. `http://localhost:5000`.
  pub fn new(base_url: &str) -> Self {
    Self::with_http_client(reqwest::Client::new(), base_url)
  }

  pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Self {
    Self {
      http,
      api_base: format!("{}/api", base_url.trim_end_matches('/')),
    }
  }

  fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
    let builder = self.http.request(method, format!("{}{}", self.api_base, path));
    match session.and_then(Session::token) {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response.json::<T>().await?);
    }
    let message = response
      .json::<ErrorBody>()
      .await
      .ok()
      .and_then(|body| body.message)
      .unwrap_or_else(|| "Request failed".to_string());
    debug!(%status, %message, "API request failed.");
    Err(ClientError::Api { status, message })
  }

  pub async fn health(&self) -> Result<HealthStatus, ClientError> {
    let response = self.request(Method::GET, "/health", None).send().await?;
    Self::decode(response).await
  }

  #[instrument(name = "StorefrontClient::register", skip(self, session, password))]
  pub async fn register(
    &self,
    session: &mut Session,
    name: &str,
    email: &str,
    password: &str,
  ) -> Result<PublicUser, ClientError> {
    let response = self
      .request(Method::POST, "/auth/register", None)
      .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
      .send()
      .await?;
    let auth: AuthResponse = Self::decode(response).await?;
    let user = auth.user.clone();
    session.establish(auth);
    Ok(user)
  }

  #[instrument(name = "StorefrontClient::login", skip(self, session, password))]
  pub async fn login(&self, session: &mut Session, email: &str, password: &str) -> Result<PublicUser, ClientError> {
    let response = self
      .request(Method::POST, "/auth/login", None)
      .json(&serde_json::json!({ "email": email, "password": password }))
      .send()
      .await?;
    let auth: AuthResponse = Self::decode(response).await?;
    let user = auth.user.clone();
    session.establish(auth);
    Ok(user)
  }

  /// Refreshes the cached profile. A rejected token ends the session.
  pub async fn me(&self, session: &mut Session) -> Result<PublicUser, ClientError> {
    if !session.is_authenticated() {
      return Err(ClientError::NotAuthenticated);
    }
    let response = self.request(Method::GET, "/users/me", Some(&*session)).send().await?;
    match Self::decode::<UserEnvelope>(response).await {
      Ok(envelope) => {
        session.set_user(envelope.user.clone());
        Ok(envelope.user)
      }
      Err(err) => {
        if err.status() == Some(StatusCode::UNAUTHORIZED) {
          session.logout();
        }
        Err(err)
      }
    }
  }

  pub async fn products(&self) -> Result<Vec<ProductListing>, ClientError> {
    let response = self.request(Method::GET, "/products", None).send().await?;
    Ok(Self::decode::<ProductsEnvelope>(response).await?.products)
  }

  pub async fn product(&self, id: Uuid) -> Result<ProductListing, ClientError> {
    let response = self
      .request(Method::GET, &format!("/products/{}", id), None)
      .send()
      .await?;
    Ok(Self::decode::<ProductEnvelope>(response).await?.product)
  }

  pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
    let response = self.request(Method::GET, "/categories", None).send().await?;
    Ok(Self::decode::<CategoriesEnvelope>(response).await?.categories)
  }

  /// Places an order for the cart's contents and empties the cart once it is accepted.
  #[instrument(name = "StorefrontClient::checkout", skip_all, fields(lines = cart.entries().len()))]
  pub async fn checkout(&self, cart: &mut Cart, details: &CustomerDetails) -> Result<Order, ClientError> {
    if cart.is_empty() {
      return Err(ClientError::EmptyCart);
    }
    let body = CheckoutRequest {
      customer_name: Some(details.name.clone()),
      customer_email: Some(details.email.clone()),
      customer_phone: details.phone.clone(),
      address: details.address.clone(),
      notes: details.notes.clone(),
      payment_method: Some(if details.pay_online { "online" } else { "cod" }.to_string()),
      items: Some(cart.to_checkout_lines()),
    };
    let response = self
      .request(Method::POST, "/orders/checkout", None)
      .json(&body)
      .send()
      .await?;
    let order = Self::decode::<OrderEnvelope>(response).await?.order;
    cart.clear();
    Ok(order)
  }

  pub async fn my_orders(&self, session: &Session) -> Result<Vec<Order>, ClientError> {
    if !session.is_authenticated() {
      return Err(ClientError::NotAuthenticated);
    }
    let response = self.request(Method::GET, "/orders/my", Some(session)).send().await?;
    Ok(Self::decode::<OrdersEnvelope>(response).await?.orders)
  }
}
