//! Engine discovery, supervision and job execution

pub mod executor;
pub mod locator;
pub mod progress;

pub use executor::{JobExecutor, JobPlan};
pub use locator::EngineLocator;
pub use progress::{DiagnosticTail, ProgressParser};
