// src/services/image_store.rs

use async_trait::async_trait;

use crate::errors::AppError;

/// Turns inline image data from an admin upload into the URL stored on a product.
#[async_trait]
pub trait ImageStore: Send + Sync {
  async fn store(&self, image_data: &str) -> Result<String, AppError>;
}

/// Keeps the data as-is; a `data:` URL works directly as an `<img>` source.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineImageStore;

#[async_trait]
impl ImageStore for InlineImageStore {
  async fn store(&self, image_data: &str) -> Result<String, AppError> {
    tracing::debug!(bytes = image_data.len(), "Storing product image inline.");
    Ok(image_data.to_string())
  }
}

/// `imageData` wins over `imageUrl` when both are present.
pub async fn resolve_image_url(
  images: &dyn ImageStore,
  image_url: Option<String>,
  image_data: Option<&str>,
) -> Result<Option<String>, AppError> {
  match image_data.filter(|d| !d.is_empty()) {
    Some(data) => Ok(Some(images.store(data).await?)),
    None => Ok(image_url),
  }
}
