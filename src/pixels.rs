use crate::errors::{HistogramError, Result};
use image::DynamicImage;

/// Read-only view of interleaved 8-bit samples, row-major, `channels` per pixel.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    samples: &'a [u8],
    width: u32,
    height: u32,
    channels: usize,
}

impl<'a> PixelBuffer<'a> {
    pub fn new(samples: &'a [u8], width: u32, height: u32, channels: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HistogramError::EmptyImage { width, height });
        }

        // Overflow can never match a real slice length
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels))
            .unwrap_or(usize::MAX);
        if channels == 0 || samples.len() != expected {
            return Err(HistogramError::BufferLayout {
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            samples,
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn samples(&self) -> &'a [u8] {
        self.samples
    }

    /// Iterates pixels as `channels`-long sample slices.
    pub fn pixels(&self) -> std::slice::ChunksExact<'a, u8> {
        self.samples.chunks_exact(self.channels)
    }

    pub fn sample(&self, row: u32, column: u32, channel: usize) -> Option<u8> {
        if row >= self.height || column >= self.width || channel >= self.channels {
            return None;
        }
        let idx = (row as usize * self.width as usize + column as usize) * self.channels + channel;
        self.samples.get(idx).copied()
    }
}

/// Owned 8-bit samples as they came out of the decoder, channel count preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    samples: Vec<u8>,
    width: u32,
    height: u32,
    channels: usize,
}

impl DecodedImage {
    pub fn new(samples: Vec<u8>, width: u32, height: u32, channels: usize) -> Result<Self> {
        PixelBuffer::new(&samples, width, height, channels)?;
        Ok(Self {
            samples,
            width,
            height,
            channels,
        })
    }

    /// Takes the decoder's native layout; wider sample types are reduced to
    /// 8 bits without adding or dropping channels.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        let (samples, channels) = match image {
            DynamicImage::ImageLuma8(buf) => (buf.into_raw(), 1),
            DynamicImage::ImageLumaA8(buf) => (buf.into_raw(), 2),
            DynamicImage::ImageRgb8(buf) => (buf.into_raw(), 3),
            DynamicImage::ImageRgba8(buf) => (buf.into_raw(), 4),
            img @ DynamicImage::ImageLuma16(_) => (img.to_luma8().into_raw(), 1),
            img @ DynamicImage::ImageLumaA16(_) => (img.to_luma_alpha8().into_raw(), 2),
            img @ (DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_)) => {
                (img.to_rgb8().into_raw(), 3)
            }
            img => (img.to_rgba8().into_raw(), 4),
        };

        Self::new(samples, width, height, channels)
    }

    pub fn as_buffer(&self) -> PixelBuffer<'_> {
        PixelBuffer {
            samples: &self.samples,
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}
