// src/models/mod.rs

pub mod category;
pub mod checkout;
pub mod order;
pub mod product;
pub mod user;

pub use category::{Category, CategoryChanges, CategoryRef, NewCategory};
pub use checkout::{CartLine, CheckoutItemPayload, CheckoutRequest};
pub use order::{NewOrder, Order, OrderChanges, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
pub use product::{NewProduct, Product, ProductChanges, ProductListing};
pub use user::{NewUser, PublicUser, Role, User};
