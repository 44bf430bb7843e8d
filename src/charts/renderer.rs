//! Static Bar Chart Renderer
//! Draws grouped bar charts with plotters and writes them as PNG or SVG.
//!
//! Layout:
//! 1. Grey panel with white horizontal grid lines, y axis description on the left
//! 2. One bar per table row, consecutive segments of rows in palette colours
//! 3. Row labels under each bar, multi-line or rotated
//! 4. Optional text annotations just above selected bars

use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

use super::layout::{self, AxisScale, LabelOrientation, YRange, ANNOTATION_LIFT};
use super::style::{
    segment_color, ANNOTATION_TEXT, AXIS_TEXT, BACKGROUND, FONT_FAMILY, FONT_SIZE, GRID,
    LABEL_FONT_SIZE, LINE_HEIGHT, PANEL,
};
use super::ChartError;

/// Half of a bar's width in category units.
const BAR_HALF_WIDTH: f64 = 0.4;
const MARGIN: u32 = 10;
const Y_LABEL_AREA: u32 = 70;
const LABEL_GAP: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Text drawn above the bar of `row`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub row: usize,
    pub text: String,
}

/// Everything needed to draw one bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Row indices where a new colour segment starts.
    pub splits: Vec<usize>,
    pub y_label: String,
    pub scale: AxisScale,
    pub stretch_ylim: bool,
    pub orientation: LabelOrientation,
    pub annotations: Vec<Annotation>,
}

impl BarChart {
    pub fn new(labels: Vec<String>, values: Vec<f64>, y_label: impl Into<String>) -> Self {
        Self {
            labels,
            values,
            splits: Vec::new(),
            y_label: y_label.into(),
            scale: AxisScale::Linear,
            stretch_ylim: false,
            orientation: LabelOrientation::Horizontal,
            annotations: Vec::new(),
        }
    }

    /// Resolve axis range, segments and label area, rejecting charts that
    /// cannot be drawn.
    fn layout(&self) -> Result<ChartLayout, ChartError> {
        if self.labels.len() != self.values.len() {
            return Err(ChartError::LabelMismatch {
                labels: self.labels.len(),
                values: self.values.len(),
            });
        }
        let rows = self.values.len();
        if let Some(a) = self.annotations.iter().find(|a| a.row >= rows) {
            return Err(ChartError::AnnotationOutOfRange { row: a.row, rows });
        }

        Ok(ChartLayout {
            y: YRange::fit(&self.values, self.scale, self.stretch_ylim)?,
            segments: layout::segments(rows, &self.splits)?,
            x_label_area: layout::x_label_area(&self.labels, self.orientation),
        })
    }
}

struct ChartLayout {
    y: YRange,
    segments: Vec<std::ops::Range<usize>>,
    x_label_area: u32,
}

fn render_err<E: Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Renders [`BarChart`]s to image files.
pub struct BarChartRenderer;

impl BarChartRenderer {
    /// Draw `chart` into `path` with the given pixel size.
    pub fn render_to_file(
        chart: &BarChart,
        path: &Path,
        format: ImageFormat,
        size: (u32, u32),
    ) -> Result<(), ChartError> {
        let layout = chart.layout()?;

        match format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                Self::draw(chart, &layout, &root)
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                Self::draw(chart, &layout, &root)
            }
        }
    }

    fn draw<DB: DrawingBackend>(
        chart: &BarChart,
        layout: &ChartLayout,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), ChartError> {
        root.fill(&BACKGROUND).map_err(render_err)?;

        let y = layout.y;
        match y.scale {
            AxisScale::Linear => Self::draw_bars(chart, layout, root, y.min..y.max)?,
            AxisScale::Log => Self::draw_bars(chart, layout, root, (y.min..y.max).log_scale())?,
        }

        root.present().map_err(render_err)
    }

    fn draw_bars<DB, Y>(
        chart: &BarChart,
        layout: &ChartLayout,
        root: &DrawingArea<DB, Shift>,
        y_range: Y,
    ) -> Result<(), ChartError>
    where
        DB: DrawingBackend,
        Y: AsRangedCoord<Value = f64>,
        Y::CoordDescType: ValueFormatter<f64>,
    {
        let rows = chart.values.len() as f64;
        let baseline = layout.y.baseline;

        let mut ctx = ChartBuilder::on(root)
            .margin(MARGIN)
            .x_label_area_size(layout.x_label_area)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(-0.5..rows - 0.5, y_range)
            .map_err(render_err)?;

        ctx.plotting_area().fill(&PANEL).map_err(render_err)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .light_line_style(PANEL)
            .bold_line_style(GRID)
            .y_desc(chart.y_label.as_str())
            .y_label_style((FONT_FAMILY, LABEL_FONT_SIZE).into_font().color(&AXIS_TEXT))
            .axis_desc_style((FONT_FAMILY, FONT_SIZE).into_font().color(&AXIS_TEXT))
            .draw()
            .map_err(render_err)?;

        for (segment, range) in layout.segments.iter().enumerate() {
            let color = segment_color(segment);
            ctx.draw_series(range.clone().map(|row| {
                let x = row as f64;
                Rectangle::new(
                    [
                        (x - BAR_HALF_WIDTH, baseline),
                        (x + BAR_HALF_WIDTH, chart.values[row]),
                    ],
                    color.filled(),
                )
            }))
            .map_err(render_err)?;
        }

        let annotation_style = (FONT_FAMILY, FONT_SIZE)
            .into_font()
            .color(&ANNOTATION_TEXT)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        ctx.draw_series(chart.annotations.iter().map(|a| {
            Text::new(
                a.text.clone(),
                (a.row as f64, chart.values[a.row] * ANNOTATION_LIFT),
                annotation_style.clone(),
            )
        }))
        .map_err(render_err)?;

        // Tick labels are drawn by hand so they can span several lines.
        for (row, label) in chart.labels.iter().enumerate() {
            let (px, py) = ctx.backend_coord(&(row as f64, layout.y.min));
            Self::draw_label(root, label, (px, py + LABEL_GAP), chart.orientation)?;
        }

        Ok(())
    }

    fn draw_label<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        label: &str,
        (x, y): (i32, i32),
        orientation: LabelOrientation,
    ) -> Result<(), ChartError> {
        let lines: Vec<&str> = layout::label_lines(label).collect();
        let font = (FONT_FAMILY, LABEL_FONT_SIZE).into_font();

        match orientation {
            LabelOrientation::Horizontal => {
                let style = font.color(&AXIS_TEXT).pos(Pos::new(HPos::Center, VPos::Top));
                for (i, line) in lines.iter().enumerate() {
                    root.draw(&Text::new(
                        line.to_string(),
                        (x, y + i as i32 * LINE_HEIGHT),
                        style.clone(),
                    ))
                    .map_err(render_err)?;
                }
            }
            LabelOrientation::Vertical => {
                let style = font
                    .transform(FontTransform::Rotate270)
                    .color(&AXIS_TEXT)
                    .pos(Pos::new(HPos::Left, VPos::Center));
                for (i, line) in lines.iter().enumerate() {
                    root.draw(&Text::new(
                        line.to_string(),
                        layout::vertical_line_origin((x, y), i, lines.len(), line),
                        style.clone(),
                    ))
                    .map_err(render_err)?;
                }
            }
        }
        Ok(())
    }
}
