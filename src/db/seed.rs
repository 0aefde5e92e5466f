// src/db/seed.rs

//! Startup seeding: the admin account, the default categories and sample products.
//! Every part checks what already exists first, so running it twice adds nothing.

use anyhow::Context;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::Store;
use crate::config::SeedAdmin;
use crate::models::{NewCategory, NewProduct, NewUser, Role};
use crate::services::auth_service;

pub const PRODUCTS_PER_CATEGORY: i64 = 10;

struct DefaultCategory {
  name: &'static str,
  description: &'static str,
  icon: &'static str,
  color: &'static str,
}

const DEFAULT_CATEGORIES: [DefaultCategory; 8] = [
  DefaultCategory {
    name: "Fruits & Vegetables",
    description: "Fresh fruits and vegetables for everyday cooking",
    icon: "🥬",
    color: "hsl(120, 50%, 92%)",
  },
  DefaultCategory {
    name: "Dairy & Eggs",
    description: "Milk, yogurt, cheese, and eggs",
    icon: "🥛",
    color: "hsl(45, 80%, 92%)",
  },
  DefaultCategory {
    name: "Snacks",
    description: "Quick bites, chips, and munchies",
    icon: "🍿",
    color: "hsl(15, 80%, 92%)",
  },
  DefaultCategory {
    name: "Beverages",
    description: "Juices, soft drinks, and more",
    icon: "🥤",
    color: "hsl(200, 70%, 92%)",
  },
  DefaultCategory {
    name: "Personal Care",
    description: "Daily personal and hygiene essentials",
    icon: "🧴",
    color: "hsl(300, 50%, 92%)",
  },
  DefaultCategory {
    name: "Household",
    description: "Home cleaning and household supplies",
    icon: "🏠",
    color: "hsl(30, 60%, 92%)",
  },
  DefaultCategory {
    name: "Bakery",
    description: "Breads, buns, and baked treats",
    icon: "🍞",
    color: "hsl(35, 80%, 92%)",
  },
  DefaultCategory {
    name: "Meat & Fish",
    description: "Fresh meat, poultry, and seafood",
    icon: "🥩",
    color: "hsl(0, 60%, 92%)",
  },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
  pub admin_created: bool,
  pub categories_created: usize,
  pub products_created: usize,
}

#[instrument(name = "seed::seed_store", skip_all, fields(admin_email = %admin.email))]
pub async fn seed_store(store: &dyn Store, admin: &SeedAdmin) -> anyhow::Result<SeedReport> {
  let mut report = SeedReport {
    admin_created: seed_admin(store, admin).await?,
    ..Default::default()
  };
  report.categories_created = seed_categories(store).await?;
  report.products_created = seed_products(store).await?;

  info!(
    admin_created = report.admin_created,
    categories_created = report.categories_created,
    products_created = report.products_created,
    "Seeding completed."
  );
  Ok(report)
}

async fn seed_admin(store: &dyn Store, admin: &SeedAdmin) -> anyhow::Result<bool> {
  if store.find_user_by_email(&admin.email).await?.is_some() {
    info!("Admin already exists: {}", admin.email);
    return Ok(false);
  }
  let password_hash = auth_service::hash_password(&admin.password).context("hashing the seed admin password")?;
  let created = store
    .create_user(NewUser {
      name: admin.name.clone(),
      email: admin.email.clone(),
      password_hash,
      role: Role::Admin,
    })
    .await
    .context("creating the seed admin")?;
  info!("Admin seeded: {}", created.email);
  Ok(true)
}

async fn seed_categories(store: &dyn Store) -> anyhow::Result<usize> {
  let mut created = 0;
  for default in DEFAULT_CATEGORIES.iter() {
    if store.find_category_by_name(default.name).await?.is_some() {
      continue;
    }
    store
      .create_category(NewCategory {
        name: default.name.to_string(),
        description: Some(default.description.to_string()),
        is_active: true,
        icon: Some(default.icon.to_string()),
        color: Some(default.color.to_string()),
      })
      .await
      .with_context(|| format!("creating category '{}'", default.name))?;
    created += 1;
  }
  Ok(created)
}

/// Tops every category up to `PRODUCTS_PER_CATEGORY` sample products.
async fn seed_products(store: &dyn Store) -> anyhow::Result<usize> {
  let mut created = 0;
  for (cat_idx, category) in store.list_categories(false).await?.into_iter().enumerate() {
    let existing = store.count_products_in_category(category.id).await?;
    for n in (existing + 1)..=PRODUCTS_PER_CATEGORY {
      let spread = cat_idx as i64 * 733 + n * 317;
      let image_url = reqwest::Url::parse_with_params(
        "https://via.placeholder.com/300",
        &[("text", format!("{} {}", category.name, n))],
      )
      .context("building placeholder image url")?;
      store
        .create_product(NewProduct {
          name: format!("{} Item {}", category.name, n),
          price: Decimal::new(100 + spread % 2000, 2),
          stock: 10 + (spread % 50) as i32,
          original_price: None,
          category_id: Some(category.id),
          description: Some(format!("Sample product {} in {}", n, category.name)),
          image_url: Some(image_url.to_string()),
          is_active: true,
        })
        .await
        .with_context(|| format!("creating sample product {} for '{}'", n, category.name))?;
      created += 1;
    }
  }
  Ok(created)
}
