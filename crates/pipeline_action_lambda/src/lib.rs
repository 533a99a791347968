//! Lambda runtime for pipeline custom actions.
//!
//! This crate owns runtime integration details (the Lambda entry point, object
//! store and job status adapters) and the stage pipeline that turns a caller
//! supplied handler into a complete custom action. Wire contracts and the zip
//! artifact codec live in `pipeline_action_core`.

pub mod adapters;
pub mod diagnostics;
pub mod error;
pub mod handlers;
pub mod job;
pub mod stages;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_support;

pub use handlers::action::{extract_job, ActionPipeline, ActionSuccessResponse};
pub use handlers::config::PipelineConfig;
