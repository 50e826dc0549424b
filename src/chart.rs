// ABOUTME: Line chart rendering for plot slides
// ABOUTME: Draws x/y series with labelled axes as SVG and rasterizes it with resvg

use crate::errors::{ReportError, Result};
use log::debug;
use quick_xml::escape::escape;
use std::io::Cursor;
use std::sync::{Arc, OnceLock};

/// 6.4in x 4.8in at 100 dpi
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 64.0;
const TICK_TARGET: usize = 6;
const MAX_TICK_DECIMALS: f64 = 12.0;
const LINE_COLOR: &str = "#1f77b4";
const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

/// Output encoding for [`Figure::render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Png,
    Svg,
}

#[derive(Debug, Clone)]
struct Series {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// A single plotting surface.
///
/// A figure is created per chart and consumed by [`Figure::render`], so no
/// plotting state survives from one chart to the next.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    series: Vec<Series>,
    x_label: String,
    y_label: String,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            series: Vec::new(),
            x_label: String::new(),
            y_label: String::new(),
        }
    }

    /// Add a line through the points `(xs[i], ys[i])`
    pub fn plot(&mut self, xs: &[f64], ys: &[f64]) -> Result<()> {
        if xs.len() != ys.len() {
            return Err(ReportError::ChartError(format!(
                "x and y must have the same length, got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(ReportError::ChartError(
                "series contains non-finite values".to_string(),
            ));
        }
        self.series.push(Series {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        });
        Ok(())
    }

    pub fn set_axis_labels(&mut self, x_label: &str, y_label: &str) {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
    }

    /// Render the figure into an in-memory buffer
    pub fn render(self, format: ChartFormat) -> Result<Vec<u8>> {
        let ((x_min, x_max), (y_min, y_max)) = self.bounds();
        if !(x_max - x_min).is_finite() || !(y_max - y_min).is_finite() {
            return Err(ReportError::ChartError(
                "data range is too large to plot".to_string(),
            ));
        }
        let svg = self.to_svg();
        match format {
            ChartFormat::Svg => Ok(svg.into_bytes()),
            ChartFormat::Png => rasterize_png(&svg, self.width, self.height),
        }
    }

    fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let x = value_range(self.series.iter().flat_map(|s| s.xs.iter().copied()));
        let y = value_range(self.series.iter().flat_map(|s| s.ys.iter().copied()));
        (widen(x.unwrap_or((0.0, 1.0))), widen(y.unwrap_or((0.0, 1.0))))
    }

    /// Build the SVG document for the figure
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.width as f64, self.height as f64);
        let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_h = (h - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let ((x_min, x_max), (y_min, y_max)) = self.bounds();

        let sx = |x: f64| MARGIN_LEFT + (x - x_min) / (x_max - x_min) * plot_w;
        let sy = |y: f64| MARGIN_TOP + plot_h - (y - y_min) / (y_max - y_min) * plot_h;

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<rect x="0" y="0" width="{w}" height="{h}" fill="white"/>
"#,
            w = self.width,
            h = self.height
        );

        let (x_ticks, x_step) = nice_ticks(x_min, x_max, TICK_TARGET);
        for tick in &x_ticks {
            let px = sx(*tick);
            let base = MARGIN_TOP + plot_h;
            svg.push_str(&format!(
                r#"<line x1="{px:.2}" y1="{base:.2}" x2="{px:.2}" y2="{end:.2}" stroke="black" stroke-width="1"/>
<text x="{px:.2}" y="{ty:.2}" font-family="{font}" font-size="12" text-anchor="middle">{label}</text>
"#,
                px = px,
                base = base,
                end = base + 5.0,
                ty = base + 20.0,
                font = FONT_FAMILY,
                label = format_tick(*tick, x_step)
            ));
        }

        let (y_ticks, y_step) = nice_ticks(y_min, y_max, TICK_TARGET);
        for tick in &y_ticks {
            let py = sy(*tick);
            svg.push_str(&format!(
                r#"<line x1="{x1:.2}" y1="{py:.2}" x2="{x2:.2}" y2="{py:.2}" stroke="black" stroke-width="1"/>
<text x="{tx:.2}" y="{ty:.2}" font-family="{font}" font-size="12" text-anchor="end">{label}</text>
"#,
                x1 = MARGIN_LEFT - 5.0,
                x2 = MARGIN_LEFT,
                py = py,
                tx = MARGIN_LEFT - 8.0,
                ty = py + 4.0,
                font = FONT_FAMILY,
                label = format_tick(*tick, y_step)
            ));
        }

        for series in &self.series {
            let points = series
                .xs
                .iter()
                .zip(&series.ys)
                .map(|(x, y)| format!("{:.2},{:.2}", sx(*x), sy(*y)))
                .collect::<Vec<_>>()
                .join(" ");
            svg.push_str(&format!(
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5" stroke-linejoin="round"/>
"#,
                points, LINE_COLOR
            ));
        }

        svg.push_str(&format!(
            r#"<rect x="{x}" y="{y}" width="{w:.2}" height="{h:.2}" fill="none" stroke="black" stroke-width="1"/>
"#,
            x = MARGIN_LEFT,
            y = MARGIN_TOP,
            w = plot_w,
            h = plot_h
        ));

        if !self.x_label.is_empty() {
            svg.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="14" text-anchor="middle">{}</text>
"#,
                MARGIN_LEFT + plot_w / 2.0,
                h - 16.0,
                FONT_FAMILY,
                escape(&self.x_label)
            ));
        }
        if !self.y_label.is_empty() {
            let (cx, cy) = (22.0, MARGIN_TOP + plot_h / 2.0);
            svg.push_str(&format!(
                r#"<text x="{cx:.2}" y="{cy:.2}" transform="rotate(-90 {cx:.2} {cy:.2})" font-family="{font}" font-size="14" text-anchor="middle">{label}</text>
"#,
                cx = cx,
                cy = cy,
                font = FONT_FAMILY,
                label = escape(&self.y_label)
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        None => Some((v, v)),
    })
}

// Degenerate ranges get padding scaled to their magnitude so scaling never
// divides by zero
fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    let magnitude = lo.abs().max(hi.abs());
    if hi - lo > f64::EPSILON * magnitude.max(1.0) {
        (lo, hi)
    } else {
        let pad = (magnitude * 1e-9).max(0.5);
        (lo - pad, hi + pad)
    }
}

/// Evenly spaced tick positions on a 1/2/5 x 10^k grid covering `[min, max]`
fn nice_ticks(min: f64, max: f64, target: usize) -> (Vec<f64>, f64) {
    let raw = (max - min) / target.max(1) as f64;
    if !(raw.is_finite() && raw > 0.0) {
        return (Vec::new(), 0.0);
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let step = magnitude
        * if normalized < 1.5 {
            1.0
        } else if normalized < 3.0 {
            2.0
        } else if normalized < 7.0 {
            5.0
        } else {
            10.0
        };
    if !(step.is_finite() && step > 0.0) {
        return (Vec::new(), 0.0);
    }

    let first = (min / step).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    let ticks = (first..=last).map(|i| i as f64 * step).collect();
    (ticks, step)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 || !(step.is_finite() && step > 0.0) {
        0
    } else {
        (-step.log10().floor()).min(MAX_TICK_DECIMALS) as usize
    };
    let text = format!("{:.*}", decimals, value);
    // Avoid "-0"
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            debug!("Loaded {} font faces for chart text", db.len());
            Arc::new(db)
        })
        .clone()
}

fn rasterize_png(svg: &str, width: u32, height: u32) -> Result<Vec<u8>> {
    let opts = usvg::Options {
        fontdb: font_database(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| ReportError::ChartError(format!("failed to parse chart svg: {}", e)))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ReportError::ChartError("failed to allocate chart pixmap".to_string()))?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // The background is opaque, so premultiplied and straight alpha agree
    let rgba = image::RgbaImage::from_raw(width, height, pixmap.data().to_vec())
        .ok_or_else(|| ReportError::ChartError("pixmap size mismatch".to_string()))?;
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(rgba).write_to(&mut out, image::ImageOutputFormat::Png)?;
    Ok(out.into_inner())
}
