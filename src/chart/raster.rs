use super::font;
use super::layout::{Layout, Orientation, PlotArea, PAD};
use super::RenderConfig;
use crate::errors::{HistogramError, Result};
use crate::histogram::HistogramSet;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, Canvas};
use imageproc::rect::Rect;
use std::io::Cursor;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const FOREGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Drops every pixel that falls outside the plot rectangle.
struct PlotCanvas<'a> {
    image: &'a mut RgbImage,
    area: PlotArea,
}

impl Canvas for PlotCanvas<'_> {
    type Pixel = Rgb<u8>;

    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        *self.image.get_pixel(x, y)
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Self::Pixel) {
        if self.area.contains(x as i32, y as i32) {
            self.image.put_pixel(x, y, color);
        }
    }
}

pub fn draw(histograms: &HistogramSet, config: &RenderConfig, layout: &Layout) -> RgbImage {
    let mut image = RgbImage::from_pixel(layout.width, layout.height, BACKGROUND);
    let plot = layout.plot;

    {
        let mut canvas = PlotCanvas {
            image: &mut image,
            area: plot,
        };
        for (channel, histogram) in histograms.iter() {
            for line in layout.series_polylines(histogram) {
                for pair in line.windows(2) {
                    stroke(&mut canvas, pair[0], pair[1], config.line_width(), channel.color());
                }
            }
        }
    }

    // Frame is drawn over the series, like axis spines
    draw_hollow_rect_mut(
        &mut image,
        Rect::at(plot.left, plot.top).of_size(plot.width() as u32 + 1, plot.height() as u32 + 1),
        FOREGROUND,
    );
    for &(from, to) in &layout.ticks {
        draw_line_segment_mut(&mut image, from, to, FOREGROUND);
    }

    for text in &layout.texts {
        match text.orientation {
            Orientation::Horizontal => {
                font::draw_text(&mut image, text.x, text.y, text.scale, FOREGROUND, &text.text)
            }
            Orientation::Vertical => {
                font::draw_text_vertical(&mut image, text.x, text.y, text.scale, FOREGROUND, &text.text)
            }
        }
    }

    image
}

fn stroke<C: Canvas<Pixel = Rgb<u8>>>(
    canvas: &mut C,
    from: (f32, f32),
    to: (f32, f32),
    width: u32,
    color: Rgb<u8>,
) {
    if width <= 1 {
        draw_line_segment_mut(canvas, from, to, color);
        return;
    }

    let first = -((width as i32 - 1) / 2);
    for k in 0..width as i32 {
        let o = (first + k) as f32;
        draw_line_segment_mut(canvas, (from.0, from.1 + o), (to.0, to.1 + o), color);
        draw_line_segment_mut(canvas, (from.0 + o, from.1), (to.0 + o, to.1), color);
    }
}

/// Crops to the bounding box of non-background pixels plus [`PAD`].
pub fn crop_to_content(image: &RgbImage) -> RgbImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel == BACKGROUND {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    let Some((x0, y0, x1, y1)) = bounds else {
        return image.clone();
    };

    let left = x0.saturating_sub(PAD);
    let top = y0.saturating_sub(PAD);
    let right = (x1 + PAD).min(image.width() - 1);
    let bottom = (y1 + PAD).min(image.height() - 1);

    image::imageops::crop_imm(image, left, top, right - left + 1, bottom - top + 1).to_image()
}

pub fn encode_image(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .map_err(|e| HistogramError::EncodeFailure {
            format: format!("{:?}", format),
            message: e.to_string(),
        })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{Channel, ChannelHistogram, BINS};

    fn flat_set(level: u64) -> HistogramSet {
        let hist = ChannelHistogram::from_counts([level; BINS]);
        HistogramSet::new(hist.clone(), hist.clone(), hist)
    }

    #[test]
    fn test_series_never_leave_plot_area() {
        let mut counts = [0u64; BINS];
        for (i, c) in counts.iter_mut().enumerate() {
            *c = (i as u64 * 7919) % 1000;
        }
        let hist = ChannelHistogram::from_counts(counts);
        let set = HistogramSet::new(hist.clone(), hist.clone(), hist);

        let config = RenderConfig::new(100.0).unwrap().with_line_width(3).unwrap();
        let layout = Layout::compute(&config);
        let image = draw(&set, &config, &layout);

        let colors: Vec<Rgb<u8>> = Channel::ALL.iter().map(|c| c.color()).collect();
        for (x, y, pixel) in image.enumerate_pixels() {
            if colors.contains(pixel) {
                assert!(layout.plot.contains(x as i32, y as i32), "series pixel at {},{}", x, y);
            }
        }
    }

    #[test]
    fn test_last_series_drawn_on_top() {
        let config = RenderConfig::new(10.0).unwrap();
        let layout = Layout::compute(&config);
        let image = draw(&flat_set(5), &config, &layout);

        // Identical curves: blue covers red and green completely
        assert!(image.pixels().any(|p| *p == Channel::Blue.color()));
        assert!(!image.pixels().any(|p| *p == Channel::Red.color()));
        assert!(!image.pixels().any(|p| *p == Channel::Green.color()));
    }

    #[test]
    fn test_crop_to_content() {
        let mut image = RgbImage::from_pixel(100, 80, BACKGROUND);
        image.put_pixel(30, 20, FOREGROUND);
        image.put_pixel(60, 50, FOREGROUND);

        let cropped = crop_to_content(&image);
        assert_eq!(cropped.dimensions(), (31 + 2 * PAD, 31 + 2 * PAD));
        assert_eq!(*cropped.get_pixel(PAD, PAD), FOREGROUND);
    }

    #[test]
    fn test_crop_clamps_at_edges() {
        let mut image = RgbImage::from_pixel(10, 10, BACKGROUND);
        image.put_pixel(0, 9, FOREGROUND);

        let cropped = crop_to_content(&image);
        assert_eq!(cropped.dimensions(), (1 + PAD, 1 + PAD));
    }

    #[test]
    fn test_crop_blank_image_unchanged() {
        let image = RgbImage::from_pixel(12, 7, BACKGROUND);
        assert_eq!(crop_to_content(&image).dimensions(), (12, 7));
    }
}
