//! Report module - figure sets and their rendering

mod config;
mod runner;

pub use config::{Preset, ReportConfig};
pub use runner::ReportRunner;
