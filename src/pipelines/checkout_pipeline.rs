// src/pipelines/checkout_pipeline.rs

use crate::errors::AppError;
use crate::models::{order, CartLine, NewOrder, OrderItem, PaymentMethod};
use crate::pipelines::contexts::{is_ad_hoc_cart, CheckoutCtxData};
use crate::state::AppState;
use crate::workflow::{ContextData, Pipeline, PipelineControl, SkipCondition, WorkflowRegistry};
use futures_util::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Customer details and at least one item are required";
pub const PRODUCTS_NOT_FOUND_MESSAGE: &str = "One or more products were not found";

fn non_blank(value: &Option<String>) -> Option<String> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn build_checkout_pipeline() -> Pipeline<CheckoutCtxData, AppError> {
  let product_only: SkipCondition<CheckoutCtxData> = Arc::new(is_ad_hoc_cart);

  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("validate_checkout_input", false, None),
    ("resolve_cart_products", false, Some(product_only.clone())),
    ("build_order_snapshot", false, None),
    ("persist_order", false, None),
    ("decrement_stock", false, Some(product_only)),
  ]);

  p.on_root("validate_checkout_input", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (name, email, items) = {
        let guard = ctx_data.read();
        (
          non_blank(&guard.request.customer_name),
          non_blank(&guard.request.customer_email),
          guard.request.items.clone().unwrap_or_default(),
        )
      };
      if name.is_none() || email.is_none() || items.is_empty() {
        return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
      }

      let lines = CartLine::classify(&items)?;
      info!(line_count = lines.len(), "Checkout input accepted.");
      ctx_data.write().lines = lines;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("resolve_cart_products", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, wanted) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.requested_quantities()?)
      };
      let ids: Vec<_> = wanted.iter().map(|(id, _)| *id).collect();

      let found: HashMap<_, _> = store
        .find_products(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
      if found.len() != ids.len() {
        warn!(requested = ids.len(), resolved = found.len(), "Checkout referenced unknown products.");
        return Err(AppError::Validation(PRODUCTS_NOT_FOUND_MESSAGE.to_string()));
      }

      for (id, quantity) in &wanted {
        if let Some(product) = found.get(id).filter(|p| p.stock < *quantity) {
          return Err(AppError::Validation(format!(
            "Insufficient stock for {}. Available: {}",
            product.name, product.stock
          )));
        }
      }

      ctx_data.write().products = found;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("build_order_snapshot", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let items = guard
        .lines
        .iter()
        .map(|line| match line {
          CartLine::Product { product, quantity } => {
            let current = guard.products.get(product).ok_or_else(|| {
              AppError::Internal(format!("Product {} was not resolved before snapshotting", product))
            })?;
            Ok(OrderItem {
              product: Some(current.id),
              name: current.name.clone(),
              quantity: *quantity,
              price: current.price,
            })
          }
          CartLine::AdHoc { name, price, quantity } => Ok(OrderItem {
            product: None,
            name: name.clone(),
            quantity: *quantity,
            price: *price,
          }),
        })
        .collect::<Result<Vec<_>, AppError>>()?;

      guard.total_amount = order::sum_items(&items)?;
      guard.items = items;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("persist_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, new_order) = {
        let guard = ctx_data.read();
        let req = &guard.request;
        let new_order = NewOrder {
          customer_name: non_blank(&req.customer_name).unwrap_or_default(),
          customer_email: non_blank(&req.customer_email).unwrap_or_default(),
          customer_phone: non_blank(&req.customer_phone),
          address: non_blank(&req.address),
          items: guard.items.clone(),
          total_amount: guard.total_amount,
          payment_method: PaymentMethod::from_request(req.payment_method.as_deref()),
          notes: non_blank(&req.notes),
        };
        (guard.app_state.store.clone(), new_order)
      };

      let created = store.create_order(new_order).await?;
      info!(order_id = %created.id, total_amount = %created.total_amount, "Order recorded.");
      ctx_data.write().order = Some(created);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Runs after the order is saved and is not rolled back with it.
  p.on_root("decrement_stock", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, wanted, order_id) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.requested_quantities()?,
          guard.order.as_ref().map(|o| o.id),
        )
      };

      let results = try_join_all(wanted.iter().map(|(id, quantity)| {
        let store = store.clone();
        async move { store.decrement_stock(*id, *quantity).await.map(|left| (*id, left)) }
      }))
      .await
      .map_err(|e| {
        error!(order_id = ?order_id, error = %e, "Stock decrement failed after the order was saved.");
        e
      })?;

      for (product_id, remaining) in results {
        if remaining.is_none() {
          warn!(order_id = ?order_id, %product_id, "Product vanished before its stock could be decremented.");
        }
      }
      ctx_data.write().stock_decremented = true;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}

pub fn register_checkout_pipeline(registry: &Arc<WorkflowRegistry<AppError>>, _app_state: &AppState) {
  registry.register_pipeline(build_checkout_pipeline());
}
