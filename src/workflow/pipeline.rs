// src/workflow/pipeline.rs

//! `Pipeline<TData, Err>`: an ordered list of named steps, each with one or more
//! handlers, executed against a shared `ContextData<TData>`.

use crate::workflow::context_data::ContextData;
use crate::workflow::control::{PipelineControl, PipelineResult};
use crate::workflow::error::WorkflowError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level};

/// A boxed async step handler.
///
/// Handlers receive a clone of the run's `ContextData` and must drop any lock guard
/// before awaiting.
type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>> + Send + Sync,
>;

/// Evaluated before a step runs; returning `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(ContextData<TData>) -> bool + Send + Sync + 'static>;

struct StepDef<TData: 'static + Send + Sync> {
  name: String,
  optional: bool,
  skip_if: Option<SkipCondition<TData>>,
}

pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  steps: Vec<StepDef<TData>>,
  on: HashMap<String, Vec<Handler<TData, Err>>>,
  // Handlers attached to names that are not declared steps; reported on run.
  dangling: Vec<String>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Declares the steps as `(name, optional, skip_if)` in execution order.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_cond_opt)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_cond_opt.clone(),
      })
      .collect();

    Self {
      steps,
      on: HashMap::new(),
      dangling: Vec::new(),
    }
  }

  fn track_step(&mut self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      event!(Level::WARN, step_name, "Handler registered for an undeclared step.");
      self.dangling.push(step_name.to_string());
    }
  }

  fn wrap<F, UserErr>(handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static) -> Handler<TData, Err>
  where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    })
  }

  /// Registers a handler for a step. Handlers of one step run in registration order.
  pub fn on_root<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.track_step(step_name);
    self
      .on
      .entry(step_name.to_string())
      .or_default()
      .push(Self::wrap(handler_fn));
  }

  async fn run_step(handlers: &[Handler<TData, Err>], ctx_data: &ContextData<TData>) -> Result<PipelineControl, Err> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(ctx_data.clone()).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, handler_idx, "Pipeline stopped by handler.");
          return Ok(PipelineControl::Stop);
        }
        Err(e) => {
          event!(Level::WARN, handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(PipelineControl::Continue)
  }

  /// Executes every step in order against `ctx_data`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    if let Some(step_name) = self.dangling.first() {
      return Err(Err::from(WorkflowError::StepNotFound {
        step_name: step_name.clone(),
      }));
    }

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(Level::DEBUG, "pipeline_step", step_name, step_index = step_idx);

      if let Some(skip_cond_fn) = &step_def.skip_if {
        if skip_cond_fn(ctx_data.clone()) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped by its condition.");
          continue;
        }
      }

      let handlers = match self.on.get(step_name).filter(|v| !v.is_empty()) {
        Some(handlers) => handlers,
        None if step_def.optional => continue,
        None => {
          return Err(Err::from(WorkflowError::HandlerMissing {
            step_name: step_def.name.clone(),
          }))
        }
      };

      let control = Self::run_step(handlers, &ctx_data).instrument(step_span).await?;
      if control == PipelineControl::Stop {
        return Ok(PipelineResult::Stopped);
      }
    }

    event!(Level::DEBUG, "Pipeline completed.");
    Ok(PipelineResult::Completed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, thiserror::Error, PartialEq, Eq)]
  enum TestError {
    #[error("workflow: {0}")]
    Workflow(#[from] WorkflowError),
    #[error("handler: {0}")]
    Handler(String),
  }

  #[derive(Default)]
  struct Trace {
    visited: Vec<&'static str>,
    skip_second: bool,
  }

  fn record(name: &'static str) -> impl Fn(ContextData<Trace>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, TestError>> + Send>> {
    move |ctx: ContextData<Trace>| {
      Box::pin(async move {
        ctx.write().visited.push(name);
        Ok(PipelineControl::Continue)
      })
    }
  }

  #[tokio::test]
  async fn runs_steps_in_declared_order() {
    let mut p = Pipeline::<Trace, TestError>::new(&[("first", false, None), ("second", false, None)]);
    p.on_root("second", record("second"));
    p.on_root("first", record("first"));
    p.on_root("first", record("first.again"));

    let ctx = ContextData::new(Trace::default());
    assert_eq!(p.run(ctx.clone()).await, Ok(PipelineResult::Completed));
    assert_eq!(ctx.read().visited, vec!["first", "first.again", "second"]);
  }

  #[tokio::test]
  async fn skip_condition_and_stop_are_honoured() {
    let skip: SkipCondition<Trace> = Arc::new(|ctx: ContextData<Trace>| ctx.read().skip_second);
    let mut p = Pipeline::<Trace, TestError>::new(&[("a", false, None), ("b", false, Some(skip)), ("c", false, None)]);
    p.on_root("a", record("a"));
    p.on_root("b", record("b"));
    p.on_root("c", |ctx: ContextData<Trace>| {
      Box::pin(async move {
        ctx.write().visited.push("c");
        Ok::<_, TestError>(PipelineControl::Stop)
      })
    });

    let ctx = ContextData::new(Trace {
      skip_second: true,
      ..Default::default()
    });
    assert_eq!(p.run(ctx.clone()).await, Ok(PipelineResult::Stopped));
    assert_eq!(ctx.read().visited, vec!["a", "c"]);
  }

  #[tokio::test]
  async fn handler_error_aborts_remaining_steps() {
    let mut p = Pipeline::<Trace, TestError>::new(&[("a", false, None), ("b", false, None)]);
    p.on_root("a", |_ctx: ContextData<Trace>| {
      Box::pin(async move { Err::<PipelineControl, _>(TestError::Handler("boom".into())) })
    });
    p.on_root("b", record("b"));

    let ctx = ContextData::new(Trace::default());
    assert_eq!(p.run(ctx.clone()).await, Err(TestError::Handler("boom".into())));
    assert!(ctx.read().visited.is_empty());
  }

  #[tokio::test]
  async fn wiring_faults_surface_as_workflow_errors() {
    let p = Pipeline::<Trace, TestError>::new(&[("required", false, None), ("extra", true, None)]);
    let result = p.run(ContextData::new(Trace::default())).await;
    assert_eq!(
      result,
      Err(TestError::Workflow(WorkflowError::HandlerMissing {
        step_name: "required".into()
      }))
    );

    let mut typo = Pipeline::<Trace, TestError>::new(&[("real", true, None)]);
    typo.on_root("reel", record("reel"));
    let result = typo.run(ContextData::new(Trace::default())).await;
    assert_eq!(
      result,
      Err(TestError::Workflow(WorkflowError::StepNotFound {
        step_name: "reel".into()
      }))
    );
  }
}
