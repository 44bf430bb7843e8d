//! ggplot-like look for the static bar charts.

use plotters::style::RGBColor;

/// Figure background outside the plotting panel.
pub const BACKGROUND: RGBColor = RGBColor(255, 255, 255);
/// Plotting panel fill.
pub const PANEL: RGBColor = RGBColor(229, 229, 229);
pub const GRID: RGBColor = RGBColor(255, 255, 255);
pub const AXIS_TEXT: RGBColor = RGBColor(85, 85, 85);
pub const ANNOTATION_TEXT: RGBColor = RGBColor(0, 0, 0);

/// Colour cycle, one entry per bar segment.
pub const PALETTE: [RGBColor; 7] = [
    RGBColor(226, 74, 51),   // Red
    RGBColor(52, 138, 189),  // Blue
    RGBColor(152, 142, 213), // Purple
    RGBColor(119, 119, 119), // Grey
    RGBColor(251, 193, 94),  // Yellow
    RGBColor(142, 186, 66),  // Green
    RGBColor(255, 181, 184), // Pink
];

pub const FONT_FAMILY: &str = "sans-serif";
pub const FONT_SIZE: f64 = 16.0;
pub const LABEL_FONT_SIZE: f64 = 14.0;

/// Pixel height of one line of x tick label text.
pub const LINE_HEIGHT: i32 = 16;
/// Rough pixel width of one label character, used to size the label area.
pub const CHAR_WIDTH: i32 = 8;

pub fn segment_color(segment: usize) -> RGBColor {
    PALETTE[segment % PALETTE.len()]
}
