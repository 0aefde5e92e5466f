// src/client/cart.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{CheckoutItemPayload, Product};

/// One cart line with the product record kept for display.
#[derive(Debug, Clone)]
pub struct CartEntry {
  pub product: Product,
  pub quantity: i32,
}

/// Shopping cart held by the caller until checkout. Lines keep the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct Cart {
  entries: Vec<CartEntry>,
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds one unit, inserting the line at quantity 1 if it is new.
  pub fn add(&mut self, product: &Product) {
    match self.entries.iter_mut().find(|e| e.product.id == product.id) {
      Some(entry) => entry.quantity += 1,
      None => self.entries.push(CartEntry {
        product: product.clone(),
        quantity: 1,
      }),
    }
  }

  /// A quantity of zero or less removes the line. Unknown products are ignored.
  pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) {
    if quantity <= 0 {
      self.remove(product_id);
      return;
    }
    if let Some(entry) = self.entries.iter_mut().find(|e| e.product.id == product_id) {
      entry.quantity = quantity;
    }
  }

  pub fn remove(&mut self, product_id: Uuid) {
    self.entries.retain(|e| e.product.id != product_id);
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn entries(&self) -> &[CartEntry] {
    &self.entries
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn quantity_of(&self, product_id: Uuid) -> i32 {
    self
      .entries
      .iter()
      .find(|e| e.product.id == product_id)
      .map_or(0, |e| e.quantity)
  }

  pub fn total_items(&self) -> i32 {
    self.entries.iter().map(|e| e.quantity).sum()
  }

  /// Display total at the prices last seen. The server recomputes the real total.
  pub fn total_price(&self) -> Decimal {
    self
      .entries
      .iter()
      .map(|e| e.product.price * Decimal::from(e.quantity))
      .sum()
  }

  pub fn to_checkout_lines(&self) -> Vec<CheckoutItemPayload> {
    self
      .entries
      .iter()
      .map(|e| CheckoutItemPayload {
        product: Some(e.product.id.to_string()),
        name: Some(e.product.name.clone()),
        price: Some(e.product.price),
        quantity: Some(e.quantity),
      })
      .collect()
  }
}
