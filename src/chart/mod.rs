//! Line-chart rendering of a [`HistogramSet`].
//!
//! The chart always spans intensities `[0, 256]` on the x axis and
//! `[0, y_limit]` on the y axis; counts above the limit are clipped.

pub mod font;
pub mod layout;
pub mod raster;
pub mod svg;

use crate::errors::{HistogramError, Result};
use crate::histogram::HistogramSet;
use crate::sink::{ChartFormat, ChartSink};
use crate::style::ChartStyle;
use image::RgbImage;
use layout::Layout;

/// Fixed x-axis range, one unit per intensity bin.
pub const X_RANGE: (f64, f64) = (0.0, 256.0);

pub const DEFAULT_TITLE: &str = "Color Histogram";
pub const DEFAULT_X_LABEL: &str = "Color value";
pub const DEFAULT_Y_LABEL: &str = "Pixel count";
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;
pub const DEFAULT_LINE_WIDTH: u32 = 1;

pub const MIN_CANVAS: (u32, u32) = (320, 240);
pub const MAX_CANVAS: (u32, u32) = (8192, 8192);
pub const MAX_LINE_WIDTH: u32 = 8;

/// Rejects zero, negative, NaN and infinite limits.
pub fn validate_y_limit(limit: f64) -> Result<f64> {
    if limit.is_finite() && limit > 0.0 {
        Ok(limit)
    } else {
        Err(HistogramError::InvalidAxisLimit { limit })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    y_limit: f64,
    title: String,
    x_label: String,
    y_label: String,
    width: u32,
    height: u32,
    line_width: u32,
}

impl RenderConfig {
    /// Default chart furniture with the given y-axis limit.
    pub fn new(y_limit: f64) -> Result<Self> {
        Ok(Self {
            y_limit: validate_y_limit(y_limit)?,
            title: DEFAULT_TITLE.to_string(),
            x_label: DEFAULT_X_LABEL.to_string(),
            y_label: DEFAULT_Y_LABEL.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            line_width: DEFAULT_LINE_WIDTH,
        })
    }

    pub fn from_style(y_limit: f64, style: &ChartStyle) -> Result<Self> {
        Ok(Self::new(y_limit)?
            .with_title(style.title.clone())
            .with_labels(style.x_label.clone(), style.y_label.clone())
            .with_canvas(style.width, style.height)?
            .with_line_width(style.line_width)?)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_canvas(mut self, width: u32, height: u32) -> Result<Self> {
        let fits = (MIN_CANVAS.0..=MAX_CANVAS.0).contains(&width)
            && (MIN_CANVAS.1..=MAX_CANVAS.1).contains(&height);
        if !fits {
            return Err(HistogramError::InvalidCanvasSize { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(self)
    }

    pub fn with_line_width(mut self, width: u32) -> Result<Self> {
        if !(1..=MAX_LINE_WIDTH).contains(&width) {
            return Err(HistogramError::InvalidLineWidth { width });
        }
        self.line_width = width;
        Ok(self)
    }

    pub fn x_range(&self) -> (f64, f64) {
        X_RANGE
    }

    pub fn y_limit(&self) -> f64 {
        self.y_limit
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn line_width(&self) -> u32 {
        self.line_width
    }
}

/// An encoded chart, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    format: ChartFormat,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl ChartArtifact {
    pub fn format(&self) -> ChartFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Dimensions after cropping.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Draws the uncropped chart onto an RGB canvas.
pub fn rasterize(histograms: &HistogramSet, config: &RenderConfig) -> Result<RgbImage> {
    validate_y_limit(config.y_limit())?;
    let layout = Layout::compute(config);
    Ok(raster::draw(histograms, config, &layout))
}

/// Renders and encodes the chart in memory without touching any sink.
pub fn encode(
    histograms: &HistogramSet,
    config: &RenderConfig,
    format: ChartFormat,
) -> Result<ChartArtifact> {
    validate_y_limit(config.y_limit())?;
    let layout = Layout::compute(config);

    let artifact = match format.image_format() {
        Some(image_format) => {
            let canvas = raster::draw(histograms, config, &layout);
            let cropped = raster::crop_to_content(&canvas);
            let bytes = raster::encode_image(&cropped, image_format)?;
            ChartArtifact {
                format,
                bytes,
                width: cropped.width(),
                height: cropped.height(),
            }
        }
        None => {
            let document = svg::render_svg(histograms, config, &layout)?;
            ChartArtifact {
                format,
                bytes: document.markup.into_bytes(),
                width: document.width,
                height: document.height,
            }
        }
    };

    log::debug!(
        "Encoded {} chart: {}x{}, {} bytes",
        artifact.format,
        artifact.width,
        artifact.height,
        artifact.bytes.len()
    );
    Ok(artifact)
}

/// Renders `histograms` and hands the finished artifact to `sink` in one write.
pub fn render<S: ChartSink + ?Sized>(
    histograms: &HistogramSet,
    config: &RenderConfig,
    sink: &mut S,
) -> Result<ChartArtifact> {
    validate_y_limit(config.y_limit())?;

    let clipped = histograms.channels_above(config.y_limit());
    if !clipped.is_empty() {
        let names: Vec<&str> = clipped.iter().map(|c| c.name()).collect();
        log::warn!(
            "Peak count {} exceeds y-axis limit {}; {} series clipped",
            histograms.max_count(),
            config.y_limit(),
            names.join(", ")
        );
    }

    let artifact = encode(histograms, config, sink.format())?;
    sink.write(&artifact)?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{build, Channel};
    use crate::pixels::PixelBuffer;
    use crate::sink::MemorySink;

    fn gradient_histograms() -> HistogramSet {
        let (w, h) = (64u32, 32u32);
        let samples: Vec<u8> = (0..w * h)
            .flat_map(|i| {
                let v = (i % 256) as u8;
                [v, v / 2, v / 4]
            })
            .collect();
        build(&PixelBuffer::new(&samples, w, h, 3).unwrap()).unwrap()
    }

    #[test]
    fn test_axis_limit_validation() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            match RenderConfig::new(bad) {
                Err(HistogramError::InvalidAxisLimit { .. }) => {}
                other => panic!("limit {} should be rejected, got {:?}", bad, other),
            }
        }
        for good in [0.001, 1.0, 5000.0, 1e9] {
            assert_eq!(RenderConfig::new(good).unwrap().y_limit(), good);
        }
    }

    #[test]
    fn test_defaults() {
        let config = RenderConfig::new(100.0).unwrap();
        assert_eq!(config.x_range(), (0.0, 256.0));
        assert_eq!(config.title(), "Color Histogram");
        assert_eq!(config.x_label(), "Color value");
        assert_eq!(config.y_label(), "Pixel count");
        assert_eq!((config.width(), config.height()), (640, 480));
        assert_eq!(config.line_width(), 1);
    }

    #[test]
    fn test_canvas_and_line_width_bounds() {
        let config = RenderConfig::new(1.0).unwrap();
        assert!(config.clone().with_canvas(319, 480).is_err());
        assert!(config.clone().with_canvas(640, 9000).is_err());
        assert!(config.clone().with_canvas(320, 240).is_ok());
        assert!(config.clone().with_line_width(0).is_err());
        assert!(config.clone().with_line_width(9).is_err());
        assert_eq!(config.with_line_width(3).unwrap().line_width(), 3);
    }

    #[test]
    fn test_render_writes_once_to_sink() {
        let histograms = gradient_histograms();
        let config = RenderConfig::new(50.0).unwrap();
        let mut sink = MemorySink::new(ChartFormat::Png);

        let artifact = render(&histograms, &config, &mut sink).unwrap();

        assert_eq!(sink.bytes(), Some(artifact.bytes()));
        assert_eq!(&artifact.bytes()[..8], b"\x89PNG\r\n\x1a\n");
        assert!(artifact.width() <= config.width());
        assert!(artifact.height() <= config.height());
    }

    #[test]
    fn test_limit_below_peak_still_renders() {
        let histograms = gradient_histograms();
        assert!(histograms.max_count() > 2);

        let config = RenderConfig::new(2.0).unwrap();
        let mut sink = MemorySink::new(ChartFormat::Png);
        assert!(render(&histograms, &config, &mut sink).is_ok());
        assert!(sink.bytes().is_some());
    }

    #[test]
    fn test_smallest_positive_limits_render() {
        let histograms = gradient_histograms();
        for limit in [5e-324, f64::MIN_POSITIVE / 1e16, f64::MIN_POSITIVE, f64::MAX] {
            let config = RenderConfig::new(limit).unwrap();
            for format in [ChartFormat::Png, ChartFormat::Svg] {
                let mut sink = MemorySink::new(format);
                render(&histograms, &config, &mut sink).unwrap();
                assert!(sink.bytes().is_some(), "limit {:e} {}", limit, format);
            }
        }
    }

    #[test]
    fn test_raster_is_cropped_and_decodable() {
        let histograms = gradient_histograms();
        let config = RenderConfig::new(20.0).unwrap();
        let artifact = encode(&histograms, &config, ChartFormat::Png).unwrap();

        let decoded = image::load_from_memory(artifact.bytes()).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (artifact.width(), artifact.height()));
        assert!(artifact.width() < config.width());

        // Crop leaves a thin white border only
        let white = image::Rgb([255u8, 255, 255]);
        assert_eq!(*decoded.get_pixel(0, 0), white);
        let row = layout::PAD;
        assert!((0..decoded.width()).any(|x| *decoded.get_pixel(x, row) != white)
            || (0..decoded.height()).any(|y| *decoded.get_pixel(row, y) != white));
    }

    #[test]
    fn test_series_colors_present() {
        let histograms = gradient_histograms();
        let config = RenderConfig::new(20.0).unwrap();
        let image = rasterize(&histograms, &config).unwrap();

        for channel in Channel::ALL {
            assert!(
                image.pixels().any(|p| *p == channel.color()),
                "no {} pixels drawn",
                channel.name()
            );
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let histograms = gradient_histograms();
        let config = RenderConfig::new(30.0).unwrap();
        for format in [ChartFormat::Png, ChartFormat::Bmp, ChartFormat::Svg] {
            assert_eq!(
                encode(&histograms, &config, format).unwrap(),
                encode(&histograms, &config, format).unwrap()
            );
        }
    }

    #[test]
    fn test_other_raster_formats_encode() {
        let histograms = gradient_histograms();
        let config = RenderConfig::new(30.0).unwrap();
        for format in [ChartFormat::Jpeg, ChartFormat::Bmp, ChartFormat::Tiff, ChartFormat::Qoi] {
            let artifact = encode(&histograms, &config, format).unwrap();
            assert!(!artifact.bytes().is_empty(), "{} produced no bytes", format);
        }
    }
}
