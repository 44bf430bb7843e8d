//! Trial Averaging Module
//! Collapses repeated measurement columns (`time_seconds_1..5`) into a
//! per-row mean column (`time_seconds`).

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use thiserror::Error;

use super::table::{Column, ColumnValues, Table, TableError};

#[derive(Error, Debug, PartialEq)]
pub enum TrialError {
    #[error("Trial group '{0}' declares no trials")]
    NoTrials(String),
    #[error("Trial group '{group}' is missing column '{column}'")]
    MissingColumn { group: String, column: String },
    #[error("Trial group '{group}': column '{column}' is not numeric")]
    NonNumericColumn { group: String, column: String },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// A family of columns `{prefix}_1 ..= {prefix}_{trials}` holding repeated
/// runs of the same measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialGroup {
    pub prefix: String,
    pub trials: usize,
    /// Fail when none of the member columns exist instead of skipping.
    #[serde(default)]
    pub required: bool,
}

impl TrialGroup {
    pub fn new(prefix: impl Into<String>, trials: usize) -> Self {
        Self {
            prefix: prefix.into(),
            trials,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn member_names(&self) -> Vec<String> {
        (1..=self.trials)
            .map(|i| format!("{}_{}", self.prefix, i))
            .collect()
    }

    /// Name of the derived mean column.
    pub fn derived_name(&self) -> &str {
        &self.prefix
    }
}

/// Handles trial column averaging.
pub struct TrialAverager;

impl TrialAverager {
    /// Add the mean column for `group` to `table`.
    ///
    /// A group is all-or-nothing: once any member column is present every
    /// member must be present and numeric. Groups with no members present
    /// are skipped unless marked required.
    pub fn apply(table: Table, group: &TrialGroup) -> Result<Table, TrialError> {
        if group.trials == 0 {
            return Err(TrialError::NoTrials(group.prefix.clone()));
        }

        let members = group.member_names();
        if !group.required && !members.iter().any(|m| table.contains(m)) {
            log::debug!("trial group '{}' not present, skipping", group.prefix);
            return Ok(table);
        }

        let mut trials: Vec<&[f64]> = Vec::with_capacity(members.len());
        for name in &members {
            let column = table.column(name).map_err(|_| TrialError::MissingColumn {
                group: group.prefix.clone(),
                column: name.clone(),
            })?;
            match &column.values {
                ColumnValues::Numeric(v) => trials.push(v),
                ColumnValues::Text(_) => {
                    return Err(TrialError::NonNumericColumn {
                        group: group.prefix.clone(),
                        column: name.clone(),
                    })
                }
            }
        }

        let means = Self::row_means(&trials, table.row_count());
        Ok(table.with_column(Column::numeric(group.derived_name(), means))?)
    }

    /// Row-wise arithmetic mean across equally long columns.
    pub fn row_means(columns: &[&[f64]], rows: usize) -> Vec<f64> {
        (0..rows)
            .map(|row| columns.iter().map(|c| c[row]).mean())
            .collect()
    }
}
