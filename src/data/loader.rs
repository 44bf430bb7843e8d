//! CSV Table Loader Module
//! Reads a result file with Polars and turns it into a column-oriented
//! [`Table`], coercing numeric columns and averaging trial groups.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::processor::{TrialAverager, TrialError, TrialGroup};
use super::table::{Column, Table, TableError};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Trial(#[from] TrialError),
}

/// Loads result tables. Stateless apart from the trial groups to average,
/// so every call reads its file afresh.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    trial_groups: Vec<TrialGroup>,
}

impl TableLoader {
    pub fn new(trial_groups: Vec<TrialGroup>) -> Self {
        Self { trial_groups }
    }

    /// Load a CSV file into a [`Table`].
    pub fn load(&self, path: &Path) -> Result<Table, LoaderError> {
        let raw = Self::read_raw(path)?;
        let columns = raw
            .into_iter()
            .map(|(name, cells)| Self::coerce(name, cells))
            .collect();

        let mut table = Table::new(columns)?;
        for group in &self.trial_groups {
            table = TrialAverager::apply(table, group)?;
        }

        log::debug!("loaded {}: {}", path.display(), table);
        Ok(table)
    }

    /// Read every column as strings, in header order.
    fn read_raw(path: &Path) -> Result<Vec<(String, Vec<String>)>, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        // A zero-length inference window makes Polars keep every column as
        // String so coercion happens here, per column.
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        df.get_columns()
            .iter()
            .map(|col| -> Result<(String, Vec<String>), LoaderError> {
                let cells = col
                    .as_materialized_series()
                    .str()?
                    .into_iter()
                    .map(|cell| cell.unwrap_or_default().to_string())
                    .collect();
                Ok((col.name().to_string(), cells))
            })
            .collect()
    }

    /// Keep a column numeric only if every cell parses as a float.
    fn coerce(name: String, cells: Vec<String>) -> Column {
        let parsed: Vec<Option<f64>> = cells.iter().map(|c| parse_number(c)).collect();

        if parsed.iter().all(Option::is_some) {
            return Column::numeric(name, parsed.into_iter().flatten().collect());
        }

        let numeric = parsed.iter().filter(|p| p.is_some()).count();
        if numeric * 2 > cells.len() {
            if let Some(row) = parsed.iter().position(Option::is_none) {
                log::warn!(
                    "column '{}' kept as text: row {} value {:?} is not numeric",
                    name,
                    row,
                    cells[row]
                );
            }
        }

        Column::text(name, cells)
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}
