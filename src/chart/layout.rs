use super::font::{text_height, text_width};
use super::{RenderConfig, X_RANGE};
use crate::histogram::{ChannelHistogram, BINS};

/// Padding kept around drawn content after cropping.
pub const PAD: u32 = 4;
pub const TICK_LEN: u32 = 5;
pub const TICK_SCALE: u32 = 2;
pub const LABEL_SCALE: u32 = 2;
pub const TITLE_SCALE: u32 = 3;
const GAP: u32 = 6;
const TARGET_TICKS: f64 = 6.0;
const MAX_TICKS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    /// Rotated counter-clockwise; (x, y) is the bottom-left corner.
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub scale: u32,
    pub orientation: Orientation,
}

impl TextItem {
    /// (left, top, right, bottom) in canvas pixels.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let w = text_width(&self.text, self.scale) as i32;
        let h = text_height(self.scale) as i32;
        match self.orientation {
            Orientation::Horizontal => (self.x, self.y, self.x + w, self.y + h),
            Orientation::Vertical => (self.x, self.y - w, self.x + h, self.y),
        }
    }
}

/// Plot rectangle in canvas pixels, edges inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PlotArea {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Evenly spaced tick values from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TickScale {
    pub step: f64,
    pub values: Vec<f64>,
}

impl TickScale {
    /// Picks a 1/2/2.5/5 x 10^k step giving about six ticks up to `max`.
    /// Limits too small to subdivide get a single tick at `max`.
    pub fn for_range(max: f64) -> Self {
        let raw = max / TARGET_TICKS;
        let magnitude = 10f64.powf(raw.log10().floor());
        let normalized = raw / magnitude;
        let nice = if normalized <= 1.0 {
            1.0
        } else if normalized <= 2.0 {
            2.0
        } else if normalized <= 2.5 {
            2.5
        } else if normalized <= 5.0 {
            5.0
        } else {
            10.0
        };
        let step = nice * magnitude;
        if !(step.is_finite() && step > 0.0) {
            return Self {
                step: max,
                values: vec![0.0, max],
            };
        }

        let count = ((max / step + 1e-9).floor() as usize).min(MAX_TICKS);
        let values = (0..=count).map(|i| i as f64 * step).collect();

        Self { step, values }
    }

    pub fn labels(&self) -> Vec<String> {
        self.values.iter().map(|&v| format_tick(v, self.step)).collect()
    }
}

/// Fixed-point for ordinary magnitudes, short scientific notation otherwise.
pub fn format_tick(value: f64, step: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if step >= 1e7 || step < 1e-4 {
        // "{:.2e}" keeps subnormal values exact where powi would underflow
        let formatted = format!("{:.2e}", value);
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        return format!("{}e{}", mantissa, exponent);
    }

    let mut decimals = 0;
    while decimals < 6 {
        let scaled = step * 10f64.powi(decimals);
        if (scaled - scaled.round()).abs() < 1e-6 * scaled.max(1.0) {
            break;
        }
        decimals += 1;
    }
    format!("{:.*}", decimals as usize, value)
}

/// Clips the segment p0-p1 to [0, x_max] x [0, y_max] (Liang-Barsky).
/// Returns the visible parameter range, if any.
pub fn clip_segment(p0: (f64, f64), p1: (f64, f64), x_max: f64, y_max: f64) -> Option<(f64, f64)> {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    let edges = [
        (-dx, p0.0),
        (dx, x_max - p0.0),
        (-dy, p0.1),
        (dy, y_max - p0.1),
    ];

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

/// Positions of every chart element for one canvas size.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub plot: PlotArea,
    pub texts: Vec<TextItem>,
    pub ticks: Vec<((f32, f32), (f32, f32))>,
    y_limit: f64,
}

impl Layout {
    pub fn compute(config: &RenderConfig) -> Self {
        let (width, height) = (config.width() as i32, config.height() as i32);
        let pad = PAD as i32;
        let gap = GAP as i32;
        let tick_len = TICK_LEN as i32;

        let x_scale = TickScale::for_range(X_RANGE.1);
        let y_scale = TickScale::for_range(config.y_limit());
        let x_labels = x_scale.labels();
        let y_labels = y_scale.labels();

        let tick_h = text_height(TICK_SCALE) as i32;
        let label_h = text_height(LABEL_SCALE) as i32;
        let title_h = text_height(TITLE_SCALE) as i32;
        let y_tick_w = y_labels
            .iter()
            .map(|l| text_width(l, TICK_SCALE) as i32)
            .max()
            .unwrap_or(0);
        let last_x_w = x_labels
            .last()
            .map(|l| text_width(l, TICK_SCALE) as i32)
            .unwrap_or(0);

        let left = pad + label_h + gap + y_tick_w + gap / 2 + tick_len;
        let top = pad + title_h + 2 * gap;
        let right = (width - pad - last_x_w / 2 - gap).max(left + 1);
        let bottom = (height - pad - label_h - gap - tick_h - gap / 2 - tick_len).max(top + 1);
        let plot = PlotArea {
            left,
            top,
            right,
            bottom,
        };

        let mut layout = Self {
            width: config.width(),
            height: config.height(),
            plot,
            texts: Vec::new(),
            ticks: Vec::new(),
            y_limit: config.y_limit(),
        };

        for (value, label) in x_scale.values.iter().zip(x_labels) {
            let (px, _) = layout.to_pixel(*value, 0.0);
            let w = text_width(&label, TICK_SCALE) as i32;
            layout.ticks.push(((px, bottom as f32), (px, (bottom + tick_len) as f32)));
            layout.texts.push(TextItem {
                x: px.round() as i32 - w / 2,
                y: bottom + tick_len + gap / 2,
                text: label,
                scale: TICK_SCALE,
                orientation: Orientation::Horizontal,
            });
        }

        for (value, label) in y_scale.values.iter().zip(y_labels) {
            let (_, py) = layout.to_pixel(0.0, *value);
            let w = text_width(&label, TICK_SCALE) as i32;
            layout.ticks.push((((left - tick_len) as f32, py), (left as f32, py)));
            layout.texts.push(TextItem {
                x: left - tick_len - gap / 2 - w,
                y: py.round() as i32 - tick_h / 2,
                text: label,
                scale: TICK_SCALE,
                orientation: Orientation::Horizontal,
            });
        }

        let centre_x = (left + right) / 2;
        let centre_y = (top + bottom) / 2;

        let title_w = text_width(config.title(), TITLE_SCALE) as i32;
        layout.texts.push(TextItem {
            text: config.title().to_string(),
            x: centre_x - title_w / 2,
            y: pad,
            scale: TITLE_SCALE,
            orientation: Orientation::Horizontal,
        });

        let x_label_w = text_width(config.x_label(), LABEL_SCALE) as i32;
        layout.texts.push(TextItem {
            text: config.x_label().to_string(),
            x: centre_x - x_label_w / 2,
            y: height - pad - label_h,
            scale: LABEL_SCALE,
            orientation: Orientation::Horizontal,
        });

        let y_label_w = text_width(config.y_label(), LABEL_SCALE) as i32;
        layout.texts.push(TextItem {
            text: config.y_label().to_string(),
            x: pad,
            y: centre_y + y_label_w / 2,
            scale: LABEL_SCALE,
            orientation: Orientation::Vertical,
        });

        layout
    }

    /// Maps data coordinates onto the canvas.
    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let px = self.plot.left as f64 + x / X_RANGE.1 * self.plot.width() as f64;
        let py = self.plot.bottom as f64 - y / self.y_limit * self.plot.height() as f64;
        (px as f32, py as f32)
    }

    /// Visible parts of a channel's curve as canvas polylines.
    pub fn series_polylines(&self, histogram: &ChannelHistogram) -> Vec<Vec<(f32, f32)>> {
        let counts = histogram.counts();
        let mut polylines: Vec<Vec<(f32, f32)>> = Vec::new();
        let mut open = false;

        for bin in 0..BINS - 1 {
            let p0 = (bin as f64, counts[bin] as f64);
            let p1 = ((bin + 1) as f64, counts[bin + 1] as f64);

            let Some((t0, t1)) = clip_segment(p0, p1, X_RANGE.1, self.y_limit) else {
                open = false;
                continue;
            };

            let lerp = |t: f64| (p0.0 + (p1.0 - p0.0) * t, p0.1 + (p1.1 - p0.1) * t);
            let (sx, sy) = lerp(t0);
            let (ex, ey) = lerp(t1);
            let start = self.to_pixel(sx, sy);
            let end = self.to_pixel(ex, ey);

            let last = polylines.len().checked_sub(1);
            match last {
                Some(i) if open && t0 == 0.0 => polylines[i].push(end),
                _ => polylines.push(vec![start, end]),
            }
            open = t1 == 1.0;
        }

        polylines
    }

    /// Bounding box (left, top, right, bottom) of all laid-out content.
    pub fn content_bounds(&self) -> (i32, i32, i32, i32) {
        let tick_len = TICK_LEN as i32;
        let mut bounds = (
            self.plot.left - tick_len,
            self.plot.top,
            self.plot.right + 1,
            self.plot.bottom + tick_len,
        );
        for text in &self.texts {
            let (l, t, r, b) = text.bounds();
            bounds = (bounds.0.min(l), bounds.1.min(t), bounds.2.max(r), bounds.3.max(b));
        }
        bounds
    }
}
