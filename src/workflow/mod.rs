// src/workflow/mod.rs

//! A small step-pipeline engine. Multi-step flows (checkout, registration, login) are
//! declared as named steps with async handlers over a shared, lockable context, and
//! dispatched through a registry keyed by context type.

pub mod context_data;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use error::WorkflowError;
pub use pipeline::{Pipeline, SkipCondition};
pub use registry::WorkflowRegistry;
