// src/workflow/error.rs
use thiserror::Error;

/// Faults in how a workflow is wired, as opposed to failures raised by step handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No workflow registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Context type mismatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },
}
