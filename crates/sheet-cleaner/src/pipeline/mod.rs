//! Pipeline module.
//!
//! This module provides the cleaning pipeline, its stages and publishing.

mod builder;
mod stage;

pub use builder::{Pipeline, PipelineBuilder, publish_table};
pub use stage::PipelineStage;
