//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the library components to perform user tasks.

pub mod analyze;
pub mod timings;
pub mod validate;

// Re-export main command functions
pub use analyze::{execute_analyze, AnalyzeArgs};
pub use timings::{execute_timings, TimingsArgs};
pub use validate::{execute_validate, ValidateArgs};
