//! Common utilities module
//!
//! This module contains shared utilities used across the melody pipeline.

pub mod error;
pub mod timing;

pub use error::{MelodyError, Result};
pub use timing::{PipelineTimings, StepTiming, Timer};
