// src/client/catalog.rs

use rust_decimal::Decimal;

use crate::models::ProductListing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  /// Keep the server's order (newest first).
  #[default]
  Recommended,
  PriceAsc,
  PriceDesc,
}

/// Client-side narrowing of a product list.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
  pub max_price: Option<Decimal>,
  /// Case-insensitive substring of the product name; blank matches everything.
  pub search: String,
  /// Category name; `None` means all categories.
  pub category: Option<String>,
  pub sort: SortOrder,
}

impl CatalogFilter {
  pub fn apply<'a>(&self, products: &'a [ProductListing]) -> Vec<&'a ProductListing> {
    let needle = self.search.trim().to_lowercase();
    let mut result: Vec<&ProductListing> = products
      .iter()
      .filter(|p| self.max_price.map_or(true, |max| p.product.price <= max))
      .filter(|p| needle.is_empty() || p.product.name.to_lowercase().contains(&needle))
      .filter(|p| match &self.category {
        None => true,
        Some(wanted) => p.category.as_ref().is_some_and(|c| &c.name == wanted),
      })
      .collect();

    match self.sort {
      SortOrder::Recommended => {}
      SortOrder::PriceAsc => result.sort_by(|a, b| a.product.price.cmp(&b.product.price)),
      SortOrder::PriceDesc => result.sort_by(|a, b| b.product.price.cmp(&a.product.price)),
    }
    result
  }
}

/// Upper bound for a price slider: the highest price rounded up to a multiple of 10,
/// or 20 when there is nothing priced.
pub fn price_ceiling(products: &[ProductListing]) -> Decimal {
  let ten = Decimal::TEN;
  let highest = products
    .iter()
    .map(|p| p.product.price)
    .max()
    .unwrap_or(Decimal::ZERO);
  if highest <= Decimal::ZERO {
    return Decimal::from(20);
  }
  (highest / ten).ceil() * ten
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{CategoryRef, Product};
  use chrono::Utc;
  use uuid::Uuid;

  fn listing(name: &str, cents: i64, category: Option<&str>) -> ProductListing {
    let category = category.map(|n| CategoryRef {
      id: Uuid::new_v4(),
      name: n.to_string(),
    });
    ProductListing {
      product: Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price: Decimal::new(cents, 2),
        stock: 5,
        original_price: None,
        category_id: category.as_ref().map(|c| c.id),
        description: None,
        image_url: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
      },
      category,
    }
  }

  fn names(list: Vec<&ProductListing>) -> Vec<String> {
    list.into_iter().map(|p| p.product.name.clone()).collect()
  }

  #[test]
  fn filters_combine() {
    let products = vec![
      listing("Whole Milk", 300, Some("Dairy")),
      listing("Oat Milk", 450, Some("Beverages")),
      listing("Cheddar", 899, Some("Dairy")),
      listing("Loose Apples", 150, None),
    ];

    let filter = CatalogFilter {
      search: "MILK".into(),
      ..Default::default()
    };
    assert_eq!(names(filter.apply(&products)), vec!["Whole Milk", "Oat Milk"]);

    let filter = CatalogFilter {
      category: Some("Dairy".into()),
      max_price: Some(Decimal::new(500, 2)),
      ..Default::default()
    };
    assert_eq!(names(filter.apply(&products)), vec!["Whole Milk"]);
  }

  #[test]
  fn sorting_by_price() {
    let products = vec![listing("B", 300, None), listing("A", 100, None), listing("C", 200, None)];
    let asc = CatalogFilter {
      sort: SortOrder::PriceAsc,
      ..Default::default()
    };
    assert_eq!(names(asc.apply(&products)), vec!["A", "C", "B"]);
    let desc = CatalogFilter {
      sort: SortOrder::PriceDesc,
      ..Default::default()
    };
    assert_eq!(names(desc.apply(&products)), vec!["B", "C", "A"]);
    assert_eq!(names(CatalogFilter::default().apply(&products)), vec!["B", "A", "C"]);
  }

  #[test]
  fn ceiling_rounds_up_to_tens() {
    assert_eq!(price_ceiling(&[]), Decimal::from(20));
    assert_eq!(price_ceiling(&[listing("Free", 0, None)]), Decimal::from(20));
    assert_eq!(price_ceiling(&[listing("A", 2099, None)]), Decimal::from(30));
    assert_eq!(price_ceiling(&[listing("A", 4000, None), listing("B", 100, None)]), Decimal::from(40));
  }
}
