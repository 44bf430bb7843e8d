//! Chart Layout Module
//! Axis ranges, bar segmentation and label area sizing. Kept free of any
//! drawing so it can be checked without a font stack.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::style::{CHAR_WIDTH, LINE_HEIGHT};
use super::ChartError;

/// Fraction of the data span added above and below when y-limits are
/// stretched around the data.
const STRETCH: f64 = 0.2;
/// Head room above the tallest bar on linear axes.
const HEAD_ROOM: f64 = 0.05;
/// Space between the axis and the first label line, plus bottom padding.
const LABEL_PADDING: i32 = 12;
/// Annotations sit this factor above the bar top.
pub const ANNOTATION_LIFT: f64 = 1.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Visible y interval and the level bars grow from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YRange {
    pub scale: AxisScale,
    pub min: f64,
    pub max: f64,
    pub baseline: f64,
}

impl YRange {
    /// Fit the axis to `values`.
    ///
    /// * linear: always includes zero, 5% head room, bars start at zero.
    /// * linear + stretch: data span widened by 20% on both sides, bars
    ///   start at the bottom of the axis when zero is out of view.
    /// * log: whole decades around the data, bars start at the bottom. The
    ///   top decade also clears an annotation lifted above the tallest bar.
    pub fn fit(values: &[f64], scale: AxisScale, stretch: bool) -> Result<Self, ChartError> {
        if values.is_empty() {
            return Err(ChartError::Empty);
        }
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(ChartError::NonFinite { row });
        }

        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        match scale {
            AxisScale::Log => {
                if let Some(row) = values.iter().position(|&v| v <= 0.0) {
                    return Err(ChartError::NonPositiveOnLogScale {
                        row,
                        value: values[row],
                    });
                }
                let min = 10f64.powf(lo.log10().floor());
                let max = 10f64.powf((hi * ANNOTATION_LIFT).log10().floor() + 1.0);
                Ok(Self {
                    scale,
                    min,
                    max,
                    baseline: min,
                })
            }
            AxisScale::Linear if stretch => {
                let span = hi - lo;
                let pad = if span > 0.0 { span * STRETCH } else { 0.5 };
                let (min, max) = (lo - pad, hi + pad);
                Ok(Self {
                    scale,
                    min,
                    max,
                    baseline: 0f64.clamp(min, max),
                })
            }
            AxisScale::Linear => {
                let lo = lo.min(0.0);
                let hi = hi.max(0.0);
                let span = if hi > lo { hi - lo } else { 1.0 };
                let min = if lo < 0.0 { lo - span * HEAD_ROOM } else { 0.0 };
                let max = if hi > 0.0 || lo == 0.0 {
                    hi + span * HEAD_ROOM
                } else {
                    0.0
                };
                Ok(Self {
                    scale,
                    min,
                    max,
                    baseline: 0.0,
                })
            }
        }
    }
}

/// Split `rows` bars at the given boundaries: `[2, 4]` over six rows gives
/// `0..2`, `2..4`, `4..6`. Boundaries past the end yield empty segments so
/// colours stay tied to segment position.
pub fn segments(rows: usize, splits: &[usize]) -> Result<Vec<Range<usize>>, ChartError> {
    if splits.windows(2).any(|w| w[0] > w[1]) {
        return Err(ChartError::UnsortedSplits(splits.to_vec()));
    }

    let mut out = Vec::with_capacity(splits.len() + 1);
    let mut start = 0;
    for &split in splits {
        let end = split.min(rows);
        out.push(start..end);
        start = end;
    }
    out.push(start..rows);
    Ok(out)
}

/// Lines of a tick label; labels are wrapped with explicit newlines.
pub fn label_lines(label: &str) -> impl Iterator<Item = &str> {
    label.split('\n')
}

/// Start point of line `index` of a vertical label whose top edge touches
/// `(x, y)`. Lines read bottom-to-top, so each one starts its own length
/// below the axis; several lines sit side by side centred on `x`.
pub fn vertical_line_origin((x, y): (i32, i32), index: usize, lines: usize, line: &str) -> (i32, i32) {
    let first = x - (lines as i32 - 1) * LINE_HEIGHT / 2;
    let length = line.chars().count() as i32 * CHAR_WIDTH;
    (first + index as i32 * LINE_HEIGHT, y + length)
}

/// Pixel size of the area below the x axis needed by `labels`.
pub fn x_label_area(labels: &[String], orientation: LabelOrientation) -> u32 {
    let extent = match orientation {
        LabelOrientation::Horizontal => {
            let lines = labels
                .iter()
                .map(|l| label_lines(l).count())
                .max()
                .unwrap_or(1);
            lines as i32 * LINE_HEIGHT
        }
        LabelOrientation::Vertical => {
            let chars = labels
                .iter()
                .flat_map(|l| label_lines(l))
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(1);
            chars as i32 * CHAR_WIDTH
        }
    };
    (extent + 2 * LABEL_PADDING) as u32
}
