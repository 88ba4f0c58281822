//! SVG rendering of component analysis results
//!
//! Every function builds its own document from a [`ComponentResult`] and
//! writes it to the handle it is given. Nothing is shared between calls;
//! callers open and close the destination.

mod svg;

pub use svg::{SvgDocument, SvgElement, TextAnchor};

use std::io::Write;

use crate::error::{Result, ZpcaError};
use crate::pca::ComponentResult;

const BAR_FILL: &str = "steelblue";
const POINT_FILL: &str = "firebrick";
const AXIS_STROKE: &str = "black";
const GRID_STROKE: &str = "lightgray";
const FONT_SIZE: f64 = 12.0;

/// Figure size and spacing
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Space reserved around the plot area for axes and titles
    pub margin: f64,
    pub point_radius: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            margin: 60.0,
            point_radius: 5.0,
        }
    }
}

impl RenderOptions {
    fn plot_width(&self) -> f64 {
        (self.width as f64 - 2.0 * self.margin).max(1.0)
    }

    fn plot_height(&self) -> f64 {
        (self.height as f64 - 2.0 * self.margin).max(1.0)
    }

    fn bottom(&self) -> f64 {
        self.height as f64 - self.margin
    }
}

/// Axis title for a component, e.g. "PC1 (42.0%)"
pub fn axis_title(result: &ComponentResult, component: usize) -> String {
    format!(
        "{} ({:.1}%)",
        result.labels[component], result.variance_ratio[component]
    )
}

/// Component index pairs to draw as 2D scatter plots
///
/// Three components are shown as their three pairwise projections.
pub fn scatter_pairs(n_components: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for x in 0..n_components {
        for y in (x + 1)..n_components {
            pairs.push((x, y));
        }
    }
    pairs
}

fn draw_axes(doc: &mut SvgDocument, options: &RenderOptions, x_title: &str, y_title: &str) {
    let (left, bottom) = (options.margin, options.bottom());
    let right = left + options.plot_width();
    doc.line(left, bottom, right, bottom, AXIS_STROKE);
    doc.line(left, bottom, left, options.margin, AXIS_STROKE);
    doc.text(
        left + options.plot_width() / 2.0,
        bottom + options.margin * 0.7,
        x_title,
        FONT_SIZE,
        TextAnchor::Middle,
    );
    doc.vertical_text(
        options.margin * 0.35,
        options.margin + options.plot_height() / 2.0,
        y_title,
        FONT_SIZE,
    );
}

/// Scree plot: explained variance per component as bars
pub fn render_scree<W: Write>(
    result: &ComponentResult,
    out: &mut W,
    options: &RenderOptions,
) -> Result<()> {
    let mut doc = SvgDocument::new(options.width, options.height);
    draw_axes(&mut doc, options, "Principal component", "Explained variance (%)");

    let n = result.n_components().max(1) as f64;
    let slot = options.plot_width() / n;
    let bar_width = slot * 0.6;
    let bottom = options.bottom();

    for tick in [25.0, 50.0, 75.0, 100.0] {
        let y = bottom - tick / 100.0 * options.plot_height();
        doc.line(options.margin, y, options.margin + options.plot_width(), y, GRID_STROKE);
        doc.text(options.margin - 6.0, y + 4.0, &format!("{}", tick), FONT_SIZE, TextAnchor::End);
    }

    for (k, (label, &ratio)) in result.labels.iter().zip(&result.variance_ratio).enumerate() {
        let height = ratio.clamp(0.0, 100.0) / 100.0 * options.plot_height();
        let x = options.margin + slot * k as f64 + (slot - bar_width) / 2.0;
        doc.rect(x, bottom - height, bar_width, height, BAR_FILL);
        doc.text(x + bar_width / 2.0, bottom - height - 4.0, &format!("{:.1}", ratio), FONT_SIZE, TextAnchor::Middle);
        doc.text(x + bar_width / 2.0, bottom + 16.0, label, FONT_SIZE, TextAnchor::Middle);
    }

    doc.write_to(out)
}

/// Map `value` from `[lo, hi]` onto `[start, start + span]`; a flat range maps to the middle
fn scale(value: f64, lo: f64, hi: f64, start: f64, span: f64) -> f64 {
    if hi > lo {
        start + (value - lo) / (hi - lo) * span
    } else {
        start + span / 2.0
    }
}

/// Scatter plot of sample scores on two components, points labeled by sample
pub fn render_scatter<W: Write>(
    result: &ComponentResult,
    x_component: usize,
    y_component: usize,
    out: &mut W,
    options: &RenderOptions,
) -> Result<()> {
    let n = result.n_components();
    if x_component >= n || y_component >= n {
        return Err(ZpcaError::InvalidInput {
            reason: format!(
                "Cannot plot components {} and {} of a {}-component result",
                x_component + 1,
                y_component + 1,
                n
            ),
        });
    }

    let mut doc = SvgDocument::new(options.width, options.height);
    draw_axes(
        &mut doc,
        options,
        &axis_title(result, x_component),
        &axis_title(result, y_component),
    );

    let xs = result.scores.values.column(x_component);
    let ys = result.scores.values.column(y_component);
    let bounds = |values: &[f64]| {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    };
    let (x_lo, x_hi) = bounds(&xs.to_vec());
    let (y_lo, y_hi) = bounds(&ys.to_vec());

    // Keep points off the axes
    let pad = options.point_radius * 3.0;
    let x_span = (options.plot_width() - 2.0 * pad).max(0.0);
    let y_span = (options.plot_height() - 2.0 * pad).max(0.0);

    for (sample, (&sx, &sy)) in result.scores.sample_ids.iter().zip(xs.iter().zip(ys.iter())) {
        let px = scale(sx, x_lo, x_hi, options.margin + pad, x_span);
        let py = options.bottom() - scale(sy, y_lo, y_hi, pad, y_span);
        doc.circle(px, py, options.point_radius, POINT_FILL);
        doc.text(px + options.point_radius + 2.0, py - options.point_radius, sample, FONT_SIZE, TextAnchor::Start);
    }

    doc.write_to(out)
}
