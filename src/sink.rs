use crate::chart::ChartArtifact;
use crate::errors::{HistogramError, Result};
use image::ImageFormat;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Tga,
    Qoi,
    WebP,
    Svg,
}

impl ChartFormat {
    /// Chooses the encoding from the destination's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let format = match extension.as_deref() {
            Some("png") => ChartFormat::Png,
            Some("jpg") | Some("jpeg") => ChartFormat::Jpeg,
            Some("bmp") => ChartFormat::Bmp,
            Some("tif") | Some("tiff") => ChartFormat::Tiff,
            Some("tga") => ChartFormat::Tga,
            Some("qoi") => ChartFormat::Qoi,
            Some("webp") => ChartFormat::WebP,
            Some("svg") => ChartFormat::Svg,
            _ => {
                return Err(HistogramError::UnsupportedOutputFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        Ok(format)
    }

    /// Raster encoder for this format; `None` for vector output.
    pub fn image_format(self) -> Option<ImageFormat> {
        match self {
            ChartFormat::Png => Some(ImageFormat::Png),
            ChartFormat::Jpeg => Some(ImageFormat::Jpeg),
            ChartFormat::Bmp => Some(ImageFormat::Bmp),
            ChartFormat::Tiff => Some(ImageFormat::Tiff),
            ChartFormat::Tga => Some(ImageFormat::Tga),
            ChartFormat::Qoi => Some(ImageFormat::Qoi),
            ChartFormat::WebP => Some(ImageFormat::WebP),
            ChartFormat::Svg => None,
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartFormat::Png => "PNG",
            ChartFormat::Jpeg => "JPEG",
            ChartFormat::Bmp => "BMP",
            ChartFormat::Tiff => "TIFF",
            ChartFormat::Tga => "TGA",
            ChartFormat::Qoi => "QOI",
            ChartFormat::WebP => "WebP",
            ChartFormat::Svg => "SVG",
        };
        f.write_str(name)
    }
}

/// Destination for a finished chart.
pub trait ChartSink {
    /// Encoding the sink expects.
    fn format(&self) -> ChartFormat;

    fn write(&mut self, artifact: &ChartArtifact) -> Result<()>;
}

/// Writes `bytes` next to `path` and renames over it, so readers only ever
/// see the old file or the complete new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let sink_error = |message: String| HistogramError::SinkWriteFailure {
        path: path.to_path_buf(),
        message,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".chromagram-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| sink_error(e.to_string()))?;

    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| sink_error(e.to_string()))?;

    // On failure the temp file is dropped and removed
    staged
        .persist(path)
        .map_err(|e| sink_error(e.error.to_string()))?;

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: ChartFormat,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = ChartFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChartSink for FileSink {
    fn format(&self) -> ChartFormat {
        self.format
    }

    fn write(&mut self, artifact: &ChartArtifact) -> Result<()> {
        write_atomic(&self.path, artifact.bytes())
    }
}

/// Keeps the artifact in memory.
#[derive(Debug, Clone)]
pub struct MemorySink {
    format: ChartFormat,
    bytes: Option<Vec<u8>>,
}

impl MemorySink {
    pub fn new(format: ChartFormat) -> Self {
        Self {
            format,
            bytes: None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl ChartSink for MemorySink {
    fn format(&self) -> ChartFormat {
        self.format
    }

    fn write(&mut self, artifact: &ChartArtifact) -> Result<()> {
        self.bytes = Some(artifact.bytes().to_vec());
        Ok(())
    }
}
