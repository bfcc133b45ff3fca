use super::font::{text_height, text_width};
use super::layout::{Layout, Orientation, PAD};
use super::RenderConfig;
use crate::errors::{HistogramError, Result};
use crate::histogram::HistogramSet;
use image::Rgb;
use std::fmt::{self, Write};

const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

/// An SVG document and the size of its view box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    pub markup: String,
    pub width: u32,
    pub height: u32,
}

fn rgb(color: Rgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Lays the chart out as vector markup cropped to its content bounds.
pub fn render_svg(
    histograms: &HistogramSet,
    config: &RenderConfig,
    layout: &Layout,
) -> Result<SvgDocument> {
    let (l, t, r, b) = layout.content_bounds();
    let pad = PAD as i32;
    let view = ViewBox {
        x: l - pad,
        y: t - pad,
        width: (r - l + 2 * pad) as u32,
        height: (b - t + 2 * pad) as u32,
    };

    let mut markup = String::new();
    write_markup(&mut markup, histograms, config, layout, &view).map_err(|e| {
        HistogramError::EncodeFailure {
            format: "SVG".to_string(),
            message: e.to_string(),
        }
    })?;

    Ok(SvgDocument {
        markup,
        width: view.width,
        height: view.height,
    })
}

#[derive(Debug, Clone, Copy)]
struct ViewBox {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

fn write_markup(
    svg: &mut String,
    histograms: &HistogramSet,
    config: &RenderConfig,
    layout: &Layout,
    view: &ViewBox,
) -> fmt::Result {
    let ViewBox {
        x: vx,
        y: vy,
        width,
        height,
    } = *view;
    let plot = layout.plot;

    writeln!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{vx} {vy} {width} {height}">"##
    )?;
    writeln!(
        svg,
        r##"<rect x="{vx}" y="{vy}" width="{width}" height="{height}" fill="#FFFFFF"/>"##
    )?;
    writeln!(
        svg,
        r##"<defs><clipPath id="plot-area"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath></defs>"##,
        plot.left,
        plot.top,
        plot.width(),
        plot.height()
    )?;

    writeln!(svg, r##"<g clip-path="url(#plot-area)" fill="none" stroke-linejoin="round">"##)?;
    for (channel, histogram) in histograms.iter() {
        let mut d = String::new();
        for line in layout.series_polylines(histogram) {
            for (i, (x, y)) in line.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                write!(d, "{}{:.2},{:.2} ", cmd, x, y)?;
            }
        }
        if d.is_empty() {
            continue;
        }
        writeln!(
            svg,
            r##"<path class="series-{}" d="{}" stroke="{}" stroke-width="{}"/>"##,
            channel.name(),
            d.trim_end(),
            rgb(channel.color()),
            config.line_width()
        )?;
    }
    writeln!(svg, "</g>")?;

    writeln!(
        svg,
        r##"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="#000000" stroke-width="1"/>"##,
        plot.left as f32 + 0.5,
        plot.top as f32 + 0.5,
        plot.width(),
        plot.height()
    )?;

    writeln!(svg, r##"<g stroke="#000000" stroke-width="1">"##)?;
    for ((x1, y1), (x2, y2)) in &layout.ticks {
        writeln!(
            svg,
            r##"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"##,
            x1, y1, x2, y2
        )?;
    }
    writeln!(svg, "</g>")?;

    writeln!(svg, r##"<g font-family="{}" fill="#000000">"##, FONT_FAMILY)?;
    for text in &layout.texts {
        if text.text.is_empty() {
            continue;
        }
        let size = 10 * text.scale;
        let h = text_height(text.scale) as i32;
        let length = text_width(&text.text, text.scale);
        let body = escape(&text.text);
        match text.orientation {
            Orientation::Horizontal => writeln!(
                svg,
                r##"<text x="{}" y="{}" font-size="{}" textLength="{}" lengthAdjust="spacingAndGlyphs">{}</text>"##,
                text.x,
                text.y + h,
                size,
                length,
                body
            )?,
            Orientation::Vertical => {
                let (ax, ay) = (text.x + h, text.y);
                writeln!(
                    svg,
                    r##"<text x="{ax}" y="{ay}" transform="rotate(-90 {ax} {ay})" font-size="{size}" textLength="{length}" lengthAdjust="spacingAndGlyphs">{body}</text>"##
                )?;
            }
        }
    }
    writeln!(svg, "</g>")?;
    svg.push_str("</svg>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{ChannelHistogram, BINS};

    fn sample_set() -> HistogramSet {
        let mut red = [0u64; BINS];
        let mut green = [0u64; BINS];
        let mut blue = [0u64; BINS];
        red[10] = 40;
        green[128] = 400;
        blue[250] = 4;
        HistogramSet::new(
            ChannelHistogram::from_counts(red),
            ChannelHistogram::from_counts(green),
            ChannelHistogram::from_counts(blue),
        )
    }

    #[test]
    fn test_svg_contains_series_and_labels() {
        let config = RenderConfig::new(100.0).unwrap();
        let layout = Layout::compute(&config);
        let doc = render_svg(&sample_set(), &config, &layout).unwrap();

        assert!(doc.markup.starts_with("<svg "));
        assert!(doc.markup.trim_end().ends_with("</svg>"));
        for color in ["#FF0000", "#008000", "#0000FF"] {
            assert!(doc.markup.contains(color), "missing {}", color);
        }
        assert!(doc.markup.contains(">Color Histogram</text>"));
        assert!(doc.markup.contains(">Color value</text>"));
        assert!(doc.markup.contains("rotate(-90"));
        assert!(doc.markup.contains(">250</text>"));
    }

    #[test]
    fn test_svg_view_box_tracks_content() {
        let config = RenderConfig::new(100.0).unwrap();
        let layout = Layout::compute(&config);
        let doc = render_svg(&sample_set(), &config, &layout).unwrap();

        assert!(doc.width > 0 && doc.width <= config.width() + 2 * PAD);
        assert!(doc.height > 0 && doc.height <= config.height() + 2 * PAD);
        assert!(doc.markup.contains(&format!(r##"width="{}""##, doc.width)));
    }

    #[test]
    fn test_svg_escapes_text() {
        let config = RenderConfig::new(10.0).unwrap().with_title("R&D <test>");
        let layout = Layout::compute(&config);
        let doc = render_svg(&sample_set(), &config, &layout).unwrap();

        assert!(doc.markup.contains(">R&amp;D &lt;test&gt;</text>"));
        assert!(!doc.markup.contains("<test>"));
    }

    #[test]
    fn test_svg_clipped_series_split() {
        let config = RenderConfig::new(10.0).unwrap();
        let layout = Layout::compute(&config);
        let doc = render_svg(&sample_set(), &config, &layout).unwrap();

        let green = doc
            .markup
            .lines()
            .find(|l| l.contains("series-green"))
            .unwrap();
        assert_eq!(green.matches('M').count(), 2);
    }
}
