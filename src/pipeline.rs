//! Decode, count, render and persist, in that order.

use crate::chart::{self, ChartArtifact, RenderConfig};
use crate::errors::Result;
use crate::histogram::{self, Channel};
use crate::pixels::DecodedImage;
use crate::sink::{self, FileSink};
use crate::style::ChartStyle;
use std::path::PathBuf;
use std::time::Instant;

/// Everything one run needs, already parsed.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub input: PathBuf,
    pub output: PathBuf,
    pub y_limit: f64,
    pub style: ChartStyle,
    /// Where to dump the raw counts as JSON, if anywhere.
    pub counts_output: Option<PathBuf>,
}

impl Invocation {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, y_limit: f64) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            y_limit,
            style: ChartStyle::default(),
            counts_output: None,
        }
    }
}

pub fn run(invocation: &Invocation) -> Result<ChartArtifact> {
    let started = Instant::now();

    // Argument checks come before any file is opened
    let config = RenderConfig::from_style(invocation.y_limit, &invocation.style)?;
    let mut sink = FileSink::new(&invocation.output)?;

    let stage = Instant::now();
    let decoded = DecodedImage::load(&invocation.input)?;
    tracing::debug!(
        input = %invocation.input.display(),
        width = decoded.width(),
        height = decoded.height(),
        channels = decoded.channels(),
        elapsed_ms = stage.elapsed().as_millis() as u64,
        "decoded input"
    );

    let stage = Instant::now();
    let histograms = histogram::build_auto(&decoded.as_buffer())?;
    tracing::debug!(
        pixels = histograms.pixel_count(),
        elapsed_ms = stage.elapsed().as_millis() as u64,
        "built histograms"
    );

    // Serialize before anything touches the disk
    let counts_json = match &invocation.counts_output {
        Some(_) => Some(serde_json::to_vec_pretty(&histograms)?),
        None => None,
    };

    let stage = Instant::now();
    let artifact = chart::render(&histograms, &config, &mut sink)?;
    tracing::debug!(
        output = %sink.path().display(),
        format = %artifact.format(),
        elapsed_ms = stage.elapsed().as_millis() as u64,
        "rendered chart"
    );

    if let (Some(counts_path), Some(json)) = (&invocation.counts_output, counts_json) {
        if let Err(err) = sink::write_atomic(counts_path, &json) {
            // A run either writes both files or neither
            if let Err(cleanup) = std::fs::remove_file(sink.path()) {
                tracing::warn!(
                    output = %sink.path().display(),
                    error = %cleanup,
                    "could not remove chart after counts write failed"
                );
            }
            return Err(err);
        }
        tracing::debug!(counts = %counts_path.display(), "wrote histogram counts");
    }

    let peaks: Vec<String> = Channel::ALL
        .iter()
        .map(|&c| format!("{}@{}", c.name(), histograms.channel(c).peak_bin()))
        .collect();
    tracing::info!(
        input = %invocation.input.display(),
        output = %invocation.output.display(),
        size = %format!("{}x{}", decoded.width(), decoded.height()),
        peaks = %peaks.join(" "),
        bytes = artifact.bytes().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "histogram chart written"
    );

    Ok(artifact)
}

