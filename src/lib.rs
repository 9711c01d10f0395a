pub mod analyze;
pub mod config;
pub mod pipeline;
pub mod process;
pub mod report;

pub use crate::config::{Config, OutputFormat};
pub use report::Report;
