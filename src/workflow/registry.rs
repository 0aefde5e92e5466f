// src/workflow/registry.rs

//! `WorkflowRegistry<E>`: holds one pipeline per context type and dispatches runs by
//! the `TypeId` of the context handed to `run`.

use crate::workflow::context_data::ContextData;
use crate::workflow::control::PipelineResult;
use crate::workflow::error::WorkflowError;
use crate::workflow::pipeline::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedPipeline<E>: Send + Sync
where
  E: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, E>;
}

#[async_trait]
impl<TData, E> ErasedPipeline<E> for Pipeline<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, E> {
    let typed_ctx_data = ctx_obj.downcast::<ContextData<TData>>().map_err(|_| {
      E::from(WorkflowError::TypeMismatch {
        expected_type: std::any::type_name::<ContextData<TData>>().to_string(),
      })
    })?;
    self.run(*typed_ctx_data).await
  }
}

/// Type-keyed registry of pipelines that all fail with the application error `E`.
pub struct WorkflowRegistry<E>
where
  E: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pipelines: RwLock<HashMap<TypeId, Arc<dyn ErasedPipeline<E>>>>,
}

impl<E> Default for WorkflowRegistry<E>
where
  E: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<E> WorkflowRegistry<E>
where
  E: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for its context type, replacing any earlier registration.
  pub fn register_pipeline<TData>(&self, pipeline: Pipeline<TData, E>)
  where
    TData: 'static + Send + Sync,
  {
    event!(Level::DEBUG, context_type = %std::any::type_name::<TData>(), "Registering workflow.");
    self
      .pipelines
      .write()
      .insert(TypeId::of::<TData>(), Arc::new(pipeline));
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, E>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self
      .pipelines
      .read()
      .get(&TypeId::of::<TData>())
      .cloned()
      .ok_or_else(|| {
        let type_name = std::any::type_name::<TData>();
        event!(Level::ERROR, context_type = type_name, "No workflow registered.");
        E::from(WorkflowError::NotRegistered {
          type_name: type_name.to_string(),
        })
      })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::workflow::control::PipelineControl;

  #[derive(Debug, thiserror::Error, PartialEq, Eq)]
  #[error(transparent)]
  struct TestError(#[from] WorkflowError);

  struct Counter(u32);
  struct Unregistered;

  #[tokio::test]
  async fn dispatches_by_context_type() {
    let registry = WorkflowRegistry::<TestError>::new();
    let mut p = Pipeline::<Counter, TestError>::new(&[("bump", false, None)]);
    p.on_root("bump", |ctx: ContextData<Counter>| {
      Box::pin(async move {
        ctx.write().0 += 1;
        Ok::<_, TestError>(PipelineControl::Continue)
      })
    });
    registry.register_pipeline(p);

    let ctx = ContextData::new(Counter(41));
    assert_eq!(registry.run(ctx.clone()).await, Ok(PipelineResult::Completed));
    assert_eq!(ctx.read().0, 42);
  }

  #[tokio::test]
  async fn unknown_context_type_is_reported() {
    let registry = WorkflowRegistry::<TestError>::new();
    let err = registry.run(ContextData::new(Unregistered)).await.unwrap_err();
    assert!(matches!(err.0, WorkflowError::NotRegistered { .. }));
  }
}
