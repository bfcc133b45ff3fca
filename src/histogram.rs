use crate::errors::{HistogramError, Result};
use crate::pixels::PixelBuffer;
use image::Rgb;
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One bin per 8-bit intensity value.
pub const BINS: usize = 256;

pub const RGB_CHANNELS: usize = 3;

/// Images at or above this size are counted on the rayon pool.
pub const PARALLEL_THRESHOLD_PIXELS: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; RGB_CHANNELS] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Sample offset within an RGB pixel.
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }

    pub fn color(self) -> Rgb<u8> {
        match self {
            Channel::Red => Rgb([255, 0, 0]),
            Channel::Green => Rgb([0, 128, 0]),
            Channel::Blue => Rgb([0, 0, 255]),
        }
    }
}

/// Exact frequency count of one channel's intensities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHistogram {
    counts: [u64; BINS],
}

impl Default for ChannelHistogram {
    fn default() -> Self {
        Self { counts: [0; BINS] }
    }
}

impl ChannelHistogram {
    pub fn from_counts(counts: [u64; BINS]) -> Self {
        Self { counts }
    }

    pub fn count(&self, bin: u8) -> u64 {
        self.counts[bin as usize]
    }

    pub fn counts(&self) -> &[u64; BINS] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Lowest bin holding the maximum count.
    pub fn peak_bin(&self) -> u8 {
        let max = self.max_count();
        self.counts.iter().position(|&c| c == max).unwrap_or(0) as u8
    }
}

impl Serialize for ChannelHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.counts.iter())
    }
}

/// Red, green and blue histograms of one image, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistogramSet {
    red: ChannelHistogram,
    green: ChannelHistogram,
    blue: ChannelHistogram,
}

impl HistogramSet {
    pub fn new(red: ChannelHistogram, green: ChannelHistogram, blue: ChannelHistogram) -> Self {
        Self { red, green, blue }
    }

    pub fn channel(&self, channel: Channel) -> &ChannelHistogram {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &ChannelHistogram)> {
        Channel::ALL.into_iter().map(move |c| (c, self.channel(c)))
    }

    pub fn max_count(&self) -> u64 {
        self.iter().map(|(_, h)| h.max_count()).max().unwrap_or(0)
    }

    /// Pixels counted per channel; identical for every channel.
    pub fn pixel_count(&self) -> u64 {
        self.red.total()
    }

    /// Channels with at least one count above `limit`.
    pub fn channels_above(&self, limit: f64) -> Vec<Channel> {
        self.iter()
            .filter(|(_, h)| h.max_count() as f64 > limit)
            .map(|(c, _)| c)
            .collect()
    }
}

impl Serialize for HistogramSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HistogramSet", RGB_CHANNELS)?;
        state.serialize_field("red", &self.red)?;
        state.serialize_field("green", &self.green)?;
        state.serialize_field("blue", &self.blue)?;
        state.end()
    }
}

fn ensure_rgb(pixels: &PixelBuffer) -> Result<()> {
    if pixels.channels() != RGB_CHANNELS {
        return Err(HistogramError::InvalidChannelCount {
            channels: pixels.channels(),
        });
    }
    Ok(())
}

/// Counts every channel in a single pass over the buffer.
pub fn build(pixels: &PixelBuffer) -> Result<HistogramSet> {
    ensure_rgb(pixels)?;

    let mut red = [0u64; BINS];
    let mut green = [0u64; BINS];
    let mut blue = [0u64; BINS];

    for px in pixels.pixels() {
        red[px[0] as usize] += 1;
        green[px[1] as usize] += 1;
        blue[px[2] as usize] += 1;
    }

    Ok(HistogramSet::new(
        ChannelHistogram::from_counts(red),
        ChannelHistogram::from_counts(green),
        ChannelHistogram::from_counts(blue),
    ))
}

/// Same result as [`build`], one rayon task per channel.
///
/// Each task owns its count array, so nothing is merged or locked.
pub fn build_parallel(pixels: &PixelBuffer) -> Result<HistogramSet> {
    ensure_rgb(pixels)?;

    let mut per_channel: Vec<ChannelHistogram> = Channel::ALL
        .par_iter()
        .map(|channel| count_channel(pixels, channel.index()))
        .collect();

    // collect() on an indexed parallel iterator keeps input order
    let blue = per_channel.pop().unwrap_or_default();
    let green = per_channel.pop().unwrap_or_default();
    let red = per_channel.pop().unwrap_or_default();

    Ok(HistogramSet::new(red, green, blue))
}

/// Picks the parallel builder for large images.
pub fn build_auto(pixels: &PixelBuffer) -> Result<HistogramSet> {
    if pixels.pixel_count() >= PARALLEL_THRESHOLD_PIXELS {
        log::debug!(
            "Counting {} pixels on {} threads",
            pixels.pixel_count(),
            rayon::current_num_threads()
        );
        build_parallel(pixels)
    } else {
        build(pixels)
    }
}

fn count_channel(pixels: &PixelBuffer, channel: usize) -> ChannelHistogram {
    let mut counts = [0u64; BINS];
    for px in pixels.pixels() {
        counts[px[channel] as usize] += 1;
    }
    ChannelHistogram::from_counts(counts)
}
