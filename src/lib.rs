//! Per-channel RGB intensity histograms and their line charts.
//!
//! [`histogram::build`] turns a decoded RGB buffer into three 256-bin
//! counts; [`chart::render`] draws them with a fixed `[0, 256]` x axis and a
//! caller-chosen y limit and hands the encoded chart to a [`sink::ChartSink`].

pub mod chart;
pub mod errors;
pub mod histogram;
pub mod image_loader;
pub mod logging;
pub mod pipeline;
pub mod pixels;
pub mod sink;
pub mod style;

pub use chart::{render, ChartArtifact, RenderConfig};
pub use errors::{HistogramError, Result};
pub use histogram::{build, build_parallel, Channel, ChannelHistogram, HistogramSet};
pub use pixels::{DecodedImage, PixelBuffer};
pub use sink::{ChartFormat, ChartSink, FileSink, MemorySink};
