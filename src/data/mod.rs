//! Data module - result table loading and trial averaging

mod loader;
mod processor;
mod table;

pub use loader::{LoaderError, TableLoader};
pub use processor::TrialGroup;
pub use table::{Table, TableError};
