// src/client/mod.rs

//! Storefront client state: the cart, the signed-in session, catalog filtering and a
//! typed HTTP client. Nothing here is global; callers own their `Cart` and `Session`.

pub mod api;
pub mod cart;
pub mod catalog;
pub mod session;

pub use api::{ClientError, CustomerDetails, HealthStatus, StorefrontClient};
pub use cart::{Cart, CartEntry};
pub use catalog::{price_ceiling, CatalogFilter, SortOrder};
pub use session::{AuthResponse, Session};
