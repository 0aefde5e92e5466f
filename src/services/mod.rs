// src/services/mod.rs

pub mod auth_service;
pub mod image_store;
pub mod token_service;

pub use image_store::{ImageStore, InlineImageStore};
pub use token_service::{Claims, TokenService};
