//! Histogram layout and rendering.
//!
//! [`BinLayout`] decides the bin edges and axis range, [`HistogramPlot`]
//! carries the binned data, and a [`HistogramRenderer`] draws it. The crate
//! ships three renderers:
//!
//! | Renderer | Output |
//! |----------|--------|
//! | [`TextHistogram`] | horizontal bar chart on any `io::Write` (the CLI uses stderr) |
//! | [`SvgHistogram`]  | standalone SVG file |
//! | [`NoopRenderer`]  | nothing; for callers that only want the values |

use crate::error::PScoreError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Bin width when only significant values are plotted.
pub const SIGNIFICANT_BIN_WIDTH: f64 = 0.002;
/// Axis maximum when only significant values are plotted.
pub const SIGNIFICANT_X_MAX: f64 = 0.05;
/// Bin width when every value is plotted.
pub const FULL_BIN_WIDTH: f64 = 0.05;
/// Axis maximum when every value is plotted.
pub const FULL_X_MAX: f64 = 1.0;

// ── Layout ───────────────────────────────────────────────────────────────────

/// Bin edges and axis range for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinLayout {
    /// Strictly increasing bin edges; `edges.len() - 1` bins.
    pub edges: Vec<f64>,
    /// Width reported in the default title (`edges[1] - edges[0]`).
    pub width: f64,
    /// Upper end of the x axis. The lower end is always 0.
    pub x_max: f64,
}

impl BinLayout {
    /// Resolve the layout for a chart.
    ///
    /// Without explicit `bins`, the `significant` flag picks 0.002-wide bins
    /// over [0, 0.05] or 0.05-wide bins over [0, 1]. Explicit edges define
    /// both the width (from the first two edges) and the axis maximum (the
    /// last edge).
    pub fn resolve(bins: Option<&[f64]>, significant: bool) -> Result<Self, PScoreError> {
        match bins {
            Some(edges) => Self::from_edges(edges),
            None if significant => Ok(Self::uniform(SIGNIFICANT_BIN_WIDTH, SIGNIFICANT_X_MAX)),
            None => Ok(Self::uniform(FULL_BIN_WIDTH, FULL_X_MAX)),
        }
    }

    /// Edges `0, w, 2w, …, x_max`. The last edge is exactly `x_max`.
    pub fn uniform(width: f64, x_max: f64) -> Self {
        let n = (x_max / width).round().max(1.0) as usize;
        let edges = (0..n)
            .map(|i| i as f64 * width)
            .chain(std::iter::once(x_max))
            .collect();
        Self {
            edges,
            width,
            x_max,
        }
    }

    fn from_edges(edges: &[f64]) -> Result<Self, PScoreError> {
        if edges.len() < 2 {
            return Err(PScoreError::InvalidBins(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
            return Err(PScoreError::InvalidBins(format!("edge {bad} is not finite")));
        }
        if let Some(w) = edges.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PScoreError::InvalidBins(format!(
                "edges must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
        let last = edges[edges.len() - 1];
        if last <= 0.0 {
            return Err(PScoreError::InvalidBins(format!(
                "last edge must be above 0, got {last}"
            )));
        }
        Ok(Self {
            edges: edges.to_vec(),
            width: edges[1] - edges[0],
            x_max: last,
        })
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Count values per bin.
    ///
    /// Bins are half-open `[lo, hi)` except the last, which is closed.
    /// Values outside the edges (and NaN) are not counted.
    pub fn counts(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0usize; self.bin_count()];
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        for &v in values {
            if !(first..=last).contains(&v) {
                continue;
            }
            let idx = (self.edges.partition_point(|&e| e <= v) - 1).min(counts.len() - 1);
            counts[idx] += 1;
        }
        counts
    }

    /// Title used when the caller gives none.
    pub fn default_title(&self) -> String {
        format!("p-values distribution (bin size: {})", self.width)
    }
}

// ── Plot data ────────────────────────────────────────────────────────────────

/// Everything a renderer needs to draw one histogram.
#[derive(Debug, Clone)]
pub struct HistogramPlot<'a> {
    pub values: &'a [f64],
    pub edges: &'a [f64],
    /// One count per bin, see [`BinLayout::counts`].
    pub counts: Vec<usize>,
    pub title: &'a str,
    pub x_max: f64,
}

impl<'a> HistogramPlot<'a> {
    pub fn new(values: &'a [f64], layout: &'a BinLayout, title: &'a str) -> Self {
        Self {
            values,
            edges: &layout.edges,
            counts: layout.counts(values),
            title,
            x_max: layout.x_max,
        }
    }

    /// `(lo, hi, count)` for every bin that starts inside `[0, x_max)`.
    pub fn visible_bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(w, &c)| (w[0], w[1], c))
            .filter(|&(lo, _, _)| lo < self.x_max)
    }
}

/// Draws a histogram.
pub trait HistogramRenderer {
    fn render(&mut self, plot: &HistogramPlot<'_>) -> Result<(), PScoreError>;
}

impl<R: HistogramRenderer + ?Sized> HistogramRenderer for Box<R> {
    fn render(&mut self, plot: &HistogramPlot<'_>) -> Result<(), PScoreError> {
        (**self).render(plot)
    }
}

/// Draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl HistogramRenderer for NoopRenderer {
    fn render(&mut self, _plot: &HistogramPlot<'_>) -> Result<(), PScoreError> {
        Ok(())
    }
}

// ── Text renderer ────────────────────────────────────────────────────────────

/// Horizontal bar chart written as plain text.
///
/// ```text
/// p-values distribution (bin size: 0.002)
/// [0.000, 0.002)  ████████████  6
/// [0.002, 0.004)  ██            1
/// n = 7
/// ```
#[derive(Debug)]
pub struct TextHistogram<W: Write> {
    out: W,
    bar_width: usize,
}

impl<W: Write> TextHistogram<W> {
    pub fn new(out: W) -> Self {
        Self { out, bar_width: 40 }
    }

    /// Longest bar, in characters. Default: 40.
    pub fn bar_width(mut self, width: usize) -> Self {
        self.bar_width = width.max(1);
        self
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_plot(&mut self, plot: &HistogramPlot<'_>) -> std::io::Result<()> {
        let peak = plot.counts.iter().copied().max().unwrap_or(0).max(1);
        let decimals = label_decimals(plot.edges);

        writeln!(self.out, "{}", plot.title)?;
        for (lo, hi, count) in plot.visible_bins() {
            let len = (count * self.bar_width).div_ceil(peak);
            writeln!(
                self.out,
                "[{lo:.prec$}, {hi:.prec$})  {bar:<width$}  {count}",
                prec = decimals,
                bar = "█".repeat(len),
                width = self.bar_width,
            )?;
        }
        writeln!(self.out, "n = {}", plot.values.len())?;
        self.out.flush()
    }
}

impl<W: Write> HistogramRenderer for TextHistogram<W> {
    fn render(&mut self, plot: &HistogramPlot<'_>) -> Result<(), PScoreError> {
        self.write_plot(plot)
            .map_err(|e| PScoreError::RenderFailed(e.to_string()))
    }
}

/// Enough decimals to tell adjacent edges apart, capped at 6.
fn label_decimals(edges: &[f64]) -> usize {
    let min_gap = edges
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);
    if !min_gap.is_finite() || min_gap <= 0.0 {
        return 3;
    }
    // Tolerance keeps 0.01-ish gaps from reading as 0.0099… and gaining a digit.
    ((-min_gap.log10() - 1e-9).ceil().max(0.0) as usize + 1).clamp(1, 6)
}

// ── SVG renderer ─────────────────────────────────────────────────────────────

/// Writes the histogram as an SVG file.
#[derive(Debug, Clone)]
pub struct SvgHistogram {
    path: PathBuf,
    width: u32,
    height: u32,
}

const SVG_MARGIN: f64 = 48.0;

impl SvgHistogram {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            width: 800,
            height: 480,
        }
    }

    /// Canvas size in pixels. Default: 800 × 480.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(200);
        self.height = height.max(150);
        self
    }

    /// Build the SVG document.
    pub fn to_svg(&self, plot: &HistogramPlot<'_>) -> String {
        let (w, h) = (self.width as f64, self.height as f64);
        let plot_w = w - 2.0 * SVG_MARGIN;
        let plot_h = h - 2.0 * SVG_MARGIN;
        let base_y = h - SVG_MARGIN;
        let peak = plot.counts.iter().copied().max().unwrap_or(0).max(1) as f64;
        let x_of = |v: f64| SVG_MARGIN + (v.min(plot.x_max) / plot.x_max) * plot_w;

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push_str(&format!(
            r#"<rect width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        ));
        svg.push_str(&format!(
            r#"<text class="title" x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
            w / 2.0,
            SVG_MARGIN / 2.0,
            escape_xml(plot.title)
        ));

        for (lo, hi, count) in plot.visible_bins() {
            let x = x_of(lo);
            let bar_w = (x_of(hi) - x).max(0.0);
            let bar_h = count as f64 / peak * plot_h;
            svg.push_str(&format!(
                r#"<rect class="bin" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="rgba(70,130,180,0.8)" stroke="white" stroke-width="1"><title>[{}, {}): {}</title></rect>"#,
                x,
                base_y - bar_h,
                bar_w,
                bar_h,
                lo,
                hi,
                count
            ));
        }

        // Axes
        svg.push_str(&format!(
            r#"<line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="black"/><line x1="{m}" y1="{b}" x2="{m}" y2="{m}" stroke="black"/>"#,
            m = SVG_MARGIN,
            b = base_y,
            r = w - SVG_MARGIN
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="12">0</text>"#,
            SVG_MARGIN,
            base_y + 16.0
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="12">{}</text>"#,
            w - SVG_MARGIN,
            base_y + 16.0,
            plot.x_max
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end" font-family="sans-serif" font-size="12">{}</text>"#,
            SVG_MARGIN - 6.0,
            SVG_MARGIN + 4.0,
            peak as usize
        ));

        svg.push_str("</svg>\n");
        svg
    }
}

impl HistogramRenderer for SvgHistogram {
    /// Write atomically: temp file, then rename.
    fn render(&mut self, plot: &HistogramPlot<'_>) -> Result<(), PScoreError> {
        let svg = self.to_svg(plot);
        let path = self.path.as_path();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PScoreError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let tmp_path = path.with_extension("svg.tmp");
        std::fs::write(&tmp_path, svg).map_err(|e| PScoreError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, path).map_err(|e| PScoreError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!("SVG histogram: {} bins", plot.counts.len());
        info!("Histogram written to {}", path.display());
        Ok(())
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
