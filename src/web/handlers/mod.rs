// src/web/handlers/mod.rs

pub mod admin_category_handlers;
pub mod admin_order_handlers;
pub mod admin_product_handlers;
pub mod auth_handlers;
pub mod catalog_handlers;
pub mod order_handlers;
pub mod user_handlers;
