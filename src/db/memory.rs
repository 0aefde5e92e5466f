// src/db/memory.rs

//! In-process store backed by `parking_lot` locks. Records are kept in insertion order,
//! so "newest first" reads iterate in reverse. Guards are never held across an `.await`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{CategoryStore, OrderStore, ProductStore, Store, UserStore};
use crate::errors::{AppError, Result};
use crate::models::{
  Category, CategoryChanges, CategoryRef, NewCategory, NewOrder, NewProduct, NewUser, Order, OrderChanges,
  OrderStatus, PaymentStatus, Product, ProductChanges, ProductListing, Role, User,
};

#[derive(Default)]
struct Tables {
  users: Vec<User>,
  categories: Vec<Category>,
  products: Vec<Product>,
  orders: Vec<Order>,
}

impl Tables {
  fn listing(&self, product: &Product) -> ProductListing {
    let category = product.category_id.and_then(|cid| {
      self
        .categories
        .iter()
        .find(|c| c.id == cid)
        .map(|c| CategoryRef {
          id: c.id,
          name: c.name.clone(),
        })
    });
    ProductListing {
      product: product.clone(),
      category,
    }
  }
}

#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn create_user(&self, new_user: NewUser) -> Result<User> {
    let mut tables = self.tables.write();
    if tables.users.iter().any(|u| u.email == new_user.email) {
      return Err(AppError::Conflict("Email already registered".to_string()));
    }
    let now = Utc::now();
    let user = User {
      id: Uuid::new_v4(),
      name: new_user.name,
      email: new_user.email,
      password_hash: new_user.password_hash,
      role: new_user.role,
      created_at: now,
      updated_at: now,
    };
    tables.users.push(user.clone());
    Ok(user)
  }

  async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.trim().to_lowercase();
    Ok(self.tables.read().users.iter().find(|u| u.email == email).cloned())
  }

  async fn count_users(&self, role: Option<Role>) -> Result<i64> {
    let tables = self.tables.read();
    let count = tables
      .users
      .iter()
      .filter(|u| role.map_or(true, |r| u.role == r))
      .count();
    Ok(count as i64)
  }
}

#[async_trait]
impl CategoryStore for MemoryStore {
  async fn list_categories(&self, only_active: bool) -> Result<Vec<Category>> {
    let tables = self.tables.read();
    Ok(
      tables
        .categories
        .iter()
        .rev()
        .filter(|c| !only_active || c.is_active)
        .cloned()
        .collect(),
    )
  }

  async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
    let name = name.trim();
    Ok(self.tables.read().categories.iter().find(|c| c.name == name).cloned())
  }

  async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
    let mut tables = self.tables.write();
    if tables.categories.iter().any(|c| c.name == new_category.name) {
      return Err(AppError::Conflict("Category name already exists".to_string()));
    }
    let now = Utc::now();
    let category = Category {
      id: Uuid::new_v4(),
      name: new_category.name,
      description: new_category.description,
      is_active: new_category.is_active,
      icon: new_category.icon,
      color: new_category.color,
      created_at: now,
      updated_at: now,
    };
    tables.categories.push(category.clone());
    Ok(category)
  }

  async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> Result<Option<Category>> {
    let mut tables = self.tables.write();
    if let Some(name) = &changes.name {
      if tables.categories.iter().any(|c| c.id != id && &c.name == name) {
        return Err(AppError::Conflict("Category name already exists".to_string()));
      }
    }
    let Some(category) = tables.categories.iter_mut().find(|c| c.id == id) else {
      return Ok(None);
    };
    if let Some(name) = changes.name {
      category.name = name;
    }
    if let Some(description) = changes.description {
      category.description = Some(description);
    }
    if let Some(is_active) = changes.is_active {
      category.is_active = is_active;
    }
    if let Some(icon) = changes.icon {
      category.icon = Some(icon);
    }
    if let Some(color) = changes.color {
      category.color = Some(color);
    }
    category.updated_at = Utc::now();
    Ok(Some(category.clone()))
  }

  async fn delete_category(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.categories.len();
    tables.categories.retain(|c| c.id != id);
    Ok(tables.categories.len() != before)
  }
}

#[async_trait]
impl ProductStore for MemoryStore {
  async fn list_products(&self, only_active: bool) -> Result<Vec<ProductListing>> {
    let tables = self.tables.read();
    Ok(
      tables
        .products
        .iter()
        .rev()
        .filter(|p| !only_active || p.is_active)
        .map(|p| tables.listing(p))
        .collect(),
    )
  }

  async fn find_product_listing(&self, id: Uuid) -> Result<Option<ProductListing>> {
    let tables = self.tables.read();
    Ok(tables.products.iter().find(|p| p.id == id).map(|p| tables.listing(p)))
  }

  async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(tables.products.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
  }

  async fn count_products_in_category(&self, category_id: Uuid) -> Result<i64> {
    let tables = self.tables.read();
    Ok(
      tables
        .products
        .iter()
        .filter(|p| p.category_id == Some(category_id))
        .count() as i64,
    )
  }

  async fn create_product(&self, new_product: NewProduct) -> Result<Product> {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: new_product.name,
      price: new_product.price,
      stock: new_product.stock,
      original_price: new_product.original_price,
      category_id: new_product.category_id,
      description: new_product.description,
      image_url: new_product.image_url,
      is_active: new_product.is_active,
      created_at: now,
      updated_at: now,
    };
    self.tables.write().products.push(product.clone());
    Ok(product)
  }

  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>> {
    let mut tables = self.tables.write();
    let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
      return Ok(None);
    };
    if let Some(name) = changes.name {
      product.name = name;
    }
    if let Some(price) = changes.price {
      product.price = price;
    }
    if let Some(stock) = changes.stock {
      product.stock = stock;
    }
    if let Some(original_price) = changes.original_price {
      product.original_price = Some(original_price);
    }
    if let Some(category_id) = changes.category_id {
      product.category_id = Some(category_id);
    }
    if let Some(description) = changes.description {
      product.description = Some(description);
    }
    if let Some(image_url) = changes.image_url {
      product.image_url = Some(image_url);
    }
    if let Some(is_active) = changes.is_active {
      product.is_active = is_active;
    }
    product.updated_at = Utc::now();
    Ok(Some(product.clone()))
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.products.len();
    tables.products.retain(|p| p.id != id);
    Ok(tables.products.len() != before)
  }

  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Option<i32>> {
    let mut tables = self.tables.write();
    let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
      return Ok(None);
    };
    product.stock -= quantity;
    product.updated_at = Utc::now();
    if product.stock < 0 {
      tracing::warn!(product_id = %id, stock = product.stock, "Stock went negative after decrement.");
    }
    Ok(Some(product.stock))
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
    let now = Utc::now();
    let order = Order {
      id: Uuid::new_v4(),
      customer_name: new_order.customer_name,
      customer_email: new_order.customer_email,
      customer_phone: new_order.customer_phone,
      address: new_order.address,
      items: new_order.items,
      total_amount: new_order.total_amount,
      status: OrderStatus::Pending,
      payment_status: PaymentStatus::Unpaid,
      payment_method: new_order.payment_method,
      notes: new_order.notes,
      created_at: now,
      updated_at: now,
    };
    self.tables.write().orders.push(order.clone());
    Ok(order)
  }

  async fn list_orders(&self) -> Result<Vec<Order>> {
    Ok(self.tables.read().orders.iter().rev().cloned().collect())
  }

  async fn list_orders_by_email(&self, email: &str) -> Result<Vec<Order>> {
    let email = email.trim();
    let tables = self.tables.read();
    Ok(
      tables
        .orders
        .iter()
        .rev()
        .filter(|o| o.customer_email.eq_ignore_ascii_case(email))
        .cloned()
        .collect(),
    )
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.iter().find(|o| o.id == id).cloned())
  }

  async fn update_order(&self, id: Uuid, changes: OrderChanges) -> Result<Option<Order>> {
    let mut tables = self.tables.write();
    let Some(order) = tables.orders.iter_mut().find(|o| o.id == id) else {
      return Ok(None);
    };
    if let Some(status) = changes.status {
      order.status = status;
    }
    if let Some(payment_status) = changes.payment_status {
      order.payment_status = payment_status;
    }
    if let Some(notes) = changes.notes {
      order.notes = Some(notes);
    }
    order.updated_at = Utc::now();
    Ok(Some(order.clone()))
  }

  async fn delete_order(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.orders.len();
    tables.orders.retain(|o| o.id != id);
    Ok(tables.orders.len() != before)
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn ping(&self) -> bool {
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal::Decimal;

  fn new_product(name: &str, category_id: Option<Uuid>, is_active: bool) -> NewProduct {
    NewProduct {
      name: name.to_string(),
      price: Decimal::new(300, 2),
      stock: 5,
      original_price: None,
      category_id,
      description: None,
      image_url: None,
      is_active,
    }
  }

  fn new_category(name: &str) -> NewCategory {
    NewCategory {
      name: name.to_string(),
      description: None,
      is_active: true,
      icon: None,
      color: None,
    }
  }

  #[tokio::test]
  async fn listings_are_newest_first_and_resolve_categories() {
    let store = MemoryStore::new();
    let dairy = store.create_category(new_category("Dairy")).await.unwrap();
    store.create_product(new_product("Milk", Some(dairy.id), true)).await.unwrap();
    store.create_product(new_product("Cheese", Some(dairy.id), false)).await.unwrap();

    let all = store.list_products(false).await.unwrap();
    assert_eq!(all[0].product.name, "Cheese");
    assert_eq!(all[1].category.as_ref().map(|c| c.name.as_str()), Some("Dairy"));

    let active = store.list_products(true).await.unwrap();
    assert_eq!(active.len(), 1);

    store.delete_category(dairy.id).await.unwrap();
    let orphaned = store.list_products(false).await.unwrap();
    assert!(orphaned.iter().all(|l| l.category.is_none()));
    assert!(orphaned.iter().all(|l| l.product.category_id == Some(dairy.id)));
  }

  #[tokio::test]
  async fn unique_names_and_emails_conflict() {
    let store = MemoryStore::new();
    store.create_category(new_category("Snacks")).await.unwrap();
    let err = store.create_category(new_category("Snacks")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let user = NewUser {
      name: "Ann".into(),
      email: "ann@example.com".into(),
      password_hash: "hash".into(),
      role: Role::User,
    };
    store.create_user(user.clone()).await.unwrap();
    assert!(matches!(store.create_user(user).await, Err(AppError::Conflict(_))));
    assert!(store.find_user_by_email(" ANN@example.com ").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn decrement_has_no_floor() {
    let store = MemoryStore::new();
    let milk = store.create_product(new_product("Milk", None, true)).await.unwrap();
    assert_eq!(store.decrement_stock(milk.id, 7).await.unwrap(), Some(-2));
    assert_eq!(store.decrement_stock(Uuid::new_v4(), 1).await.unwrap(), None);
  }
}
