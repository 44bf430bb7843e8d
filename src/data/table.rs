//! Column-oriented result table.
//! Columns keep the order in which they first appear in the source file.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Column '{name}' has {found} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("Missing column '{0}'")]
    MissingColumn(String),
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("Column '{0}' is not text")]
    NotText(String),
}

/// Values of a single column: either every cell parsed as a number, or the
/// raw strings as read.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
        }
    }
}

/// One loaded result file.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table, checking that names are unique and every column has
    /// the same number of rows.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(|c| c.values.len()).unwrap_or(0);

        for (i, column) in columns.iter().enumerate() {
            if column.values.len() != rows {
                return Err(TableError::RaggedColumn {
                    name: column.name.clone(),
                    expected: rows,
                    found: column.values.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64], TableError> {
        match &self.column(name)?.values {
            ColumnValues::Numeric(v) => Ok(v),
            ColumnValues::Text(_) => Err(TableError::NotNumeric(name.to_string())),
        }
    }

    pub fn text(&self, name: &str) -> Result<&[String], TableError> {
        match &self.column(name)?.values {
            ColumnValues::Text(v) => Ok(v),
            ColumnValues::Numeric(_) => Err(TableError::NotText(name.to_string())),
        }
    }

    /// Values of a column as display strings. Whole numbers keep one
    /// decimal place (`1.0`) since every numeric cell is a float.
    pub fn labels(&self, name: &str) -> Result<Vec<String>, TableError> {
        Ok(match &self.column(name)?.values {
            ColumnValues::Text(v) => v.clone(),
            ColumnValues::Numeric(v) => v.iter().map(|&x| float_label(x)).collect(),
        })
    }

    /// Add a column, replacing an existing one of the same name in place.
    pub fn with_column(mut self, column: Column) -> Result<Self, TableError> {
        if !self.columns.is_empty() && column.values.len() != self.rows {
            return Err(TableError::RaggedColumn {
                name: column.name,
                expected: self.rows,
                found: column.values.len(),
            });
        }
        if self.columns.is_empty() {
            self.rows = column.values.len();
        }

        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }
}

fn float_label(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 8;

        writeln!(f, "{} rows x {} columns", self.rows, self.columns.len())?;
        for column in &self.columns {
            let cells: Vec<String> = match &column.values {
                ColumnValues::Numeric(v) => v.iter().take(PREVIEW).map(|x| x.to_string()).collect(),
                ColumnValues::Text(v) => v.iter().take(PREVIEW).map(|s| format!("{s:?}")).collect(),
            };
            let more = if self.rows > PREVIEW { ", ..." } else { "" };
            writeln!(f, "  {}: [{}{}]", column.name, cells.join(", "), more)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::text("name", vec!["blini (k=5)".into(), "mmseqs".into()]),
            Column::numeric("ari", vec![0.5, 0.75]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::numeric("a", vec![1.0, 2.0]),
            Column::numeric("b", vec![1.0]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::RaggedColumn {
                name: "b".into(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("a", vec![2.0]),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".into()));
    }

    #[test]
    fn typed_access() {
        let table = sample();
        assert_eq!(table.numeric("ari").unwrap(), &[0.5, 0.75]);
        assert_eq!(table.text("name").unwrap()[1], "mmseqs");
        assert_eq!(
            table.numeric("name").unwrap_err(),
            TableError::NotNumeric("name".into())
        );
        assert_eq!(
            table.text("ari").unwrap_err(),
            TableError::NotText("ari".into())
        );
        assert_eq!(
            table.column("missing").unwrap_err(),
            TableError::MissingColumn("missing".into())
        );
    }

    #[test]
    fn with_column_replaces_in_place() {
        let table = sample()
            .with_column(Column::numeric("name", vec![1.0, 2.0]))
            .unwrap()
            .with_column(Column::numeric("extra", vec![3.0, 4.0]))
            .unwrap();
        assert_eq!(table.column_names(), vec!["name", "ari", "extra"]);
        assert_eq!(table.numeric("name").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn with_column_checks_length() {
        let err = sample()
            .with_column(Column::numeric("x", vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, TableError::RaggedColumn { .. }));
    }

    #[test]
    fn labels_format_numbers() {
        let table = sample();
        assert_eq!(table.labels("ari").unwrap(), vec!["0.5", "0.75"]);

        let k = Table::new(vec![Column::numeric("k", vec![5.0, -3.0, 0.0, 2.5])]).unwrap();
        assert_eq!(k.labels("k").unwrap(), vec!["5.0", "-3.0", "0.0", "2.5"]);
    }

    #[test]
    fn display_lists_columns() {
        let out = sample().to_string();
        assert!(out.starts_with("2 rows x 2 columns"));
        assert!(out.contains("ari: [0.5, 0.75]"));
    }
}
