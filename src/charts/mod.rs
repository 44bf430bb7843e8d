//! Charts module - static bar chart rendering

mod layout;
mod renderer;
mod style;

pub use layout::{AxisScale, LabelOrientation};
pub use renderer::{Annotation, BarChart, BarChartRenderer, ImageFormat};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ChartError {
    #[error("No values to plot")]
    Empty,
    #[error("{labels} labels for {values} values")]
    LabelMismatch { labels: usize, values: usize },
    #[error("Value at row {row} is not finite")]
    NonFinite { row: usize },
    #[error("Value {value} at row {row} cannot be shown on a log scale")]
    NonPositiveOnLogScale { row: usize, value: f64 },
    #[error("Segment boundaries must be ascending: {0:?}")]
    UnsortedSplits(Vec<usize>),
    #[error("Annotation row {row} is out of range for {rows} rows")]
    AnnotationOutOfRange { row: usize, rows: usize },
    #[error("Failed to draw chart: {0}")]
    Render(String),
}
