//! Horizontal bar chart of the most frequent keys, rendered to SVG markup.

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use thiserror::Error;

use crate::stats::{sort_desc, Counts};

/// Bars drawn per chart.
pub const TOP_N: usize = 15;

pub const X_AXIS_LABEL: &str = "Number of jobs";

const CANVAS_PX: (u32, u32) = (640, 480);
// 6.4in x 4.8in canvas declared in points, the size `prepare_figure` strips.
const CANVAS_PX_ATTRS: &str = r#"width="640" height="480""#;
const CANVAS_PT_ATTRS: &str = r#"width="460.8pt" height="345.6pt""#;

const FIXED_HEIGHT: &str = r#"height="345.6pt""#;
const FIXED_WIDTH: &str = r#"width="460.8pt""#;
const FLUID_WIDTH: &str = r#"width="100%""#;

const BAR_COLOR: RGBColor = RGBColor(128, 128, 128);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Top `TOP_N` pairs by count, reversed so the largest ends up at the top
/// of a chart whose categories grow upwards.
pub fn top_bars(counts: &Counts) -> Vec<(String, usize)> {
    let mut bars = sort_desc(counts);
    bars.truncate(TOP_N);
    bars.reverse();
    bars
}

pub fn render(counts: &Counts, category_label: &str) -> Result<String, RenderError> {
    let bars = top_bars(counts);
    let svg = draw_barh(&bars, category_label)?;
    Ok(prepare_figure(&svg))
}

/// Drops the fixed height and makes the width follow the container.
/// Exact-literal substitution only; markup without the literals is returned as is.
pub fn prepare_figure(input: &str) -> String {
    input
        .replace(FIXED_HEIGHT, "")
        .replace(FIXED_WIDTH, FLUID_WIDTH)
}

fn draw_barh(bars: &[(String, usize)], category_label: &str) -> Result<String, RenderError> {
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, CANVAS_PX).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let rows = bars.len().max(1) as u32;
        let max = bars.iter().map(|(_, c)| *c as u32).max().unwrap_or(0).max(1);
        let x_max = max + max / 10 + 1;

        let mut chart = ChartBuilder::on(&root)
            .margin(8)
            .x_label_area_size(40)
            .y_label_area_size(y_label_area(bars))
            // integer ranges are inclusive once segmented
            .build_cartesian_2d(0u32..x_max, (0u32..rows - 1).into_segmented())
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(X_AXIS_LABEL)
            .y_desc(category_label)
            .y_labels(rows as usize)
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => bars
                    .get(*i as usize)
                    .map(|(key, _)| key.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(draw_err)?;

        let grid_style = BLACK.mix(0.3).stroke_width(1);
        for line in grid_lines(x_max, rows) {
            chart
                .draw_series(DashedLineSeries::new(line, 1, 3, grid_style))
                .map_err(draw_err)?;
        }

        chart
            .draw_series(
                Histogram::horizontal(&chart)
                    .style(BAR_COLOR.mix(0.5).filled())
                    .margin(4)
                    .data(
                        bars.iter()
                            .enumerate()
                            .map(|(i, (_, count))| (i as u32, *count as u32)),
                    ),
            )
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(buffer.replacen(CANVAS_PX_ATTRS, CANVAS_PT_ATTRS, 1))
}

/// Roughly ten evenly spaced grid positions in `0..=x_max`.
fn grid_ticks(x_max: u32) -> Vec<u32> {
    let step = (x_max / 10).max(1);
    (step..=x_max).step_by(step as usize).collect()
}

type GridLine = [(u32, SegmentValue<u32>); 2];

/// Dotted grid on both axes: vertical lines at the x ticks, then one
/// horizontal line through the centre of each category row.
fn grid_lines(x_max: u32, rows: u32) -> Vec<GridLine> {
    let vertical = grid_ticks(x_max)
        .into_iter()
        .map(|x| [(x, SegmentValue::Exact(0)), (x, SegmentValue::Last)]);
    let horizontal =
        (0..rows).map(|i| [(0, SegmentValue::CenterOf(i)), (x_max, SegmentValue::CenterOf(i))]);
    vertical.chain(horizontal).collect()
}

fn y_label_area(bars: &[(String, usize)]) -> u32 {
    let longest = bars
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0) as u32;
    (longest * 7 + 30).clamp(60, 240)
}
