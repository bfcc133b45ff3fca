use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistogramError {
    #[error("Expected an RGB image with 3 channels, got {channels} channel(s)")]
    InvalidChannelCount { channels: usize },

    #[error("Invalid y-axis limit {limit}: must be a positive finite number")]
    InvalidAxisLimit { limit: f64 },

    #[error("Pixel buffer holds {actual} samples, layout requires {expected}")]
    BufferLayout { expected: usize, actual: usize },

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },

    #[error("Invalid line width {width}")]
    InvalidLineWidth { width: u32 },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to decode image '{path}': {message}")]
    DecodeFailure { path: PathBuf, message: String },

    #[error("Unsupported output format for '{path}'")]
    UnsupportedOutputFormat { path: PathBuf },

    #[error("Failed to encode {format} chart: {message}")]
    EncodeFailure { format: String, message: String },

    #[error("Failed to write '{path}': {message}")]
    SinkWriteFailure { path: PathBuf, message: String },

    #[error("Invalid chart style '{path}': {message}")]
    StyleConfig { path: PathBuf, message: String },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, HistogramError>;

impl HistogramError {
    /// A hint on how to fix the input, shown under the error message.
    pub fn suggestion(&self) -> &'static str {
        match self {
            HistogramError::InvalidChannelCount { .. } => {
                "Only 3-channel RGB images are supported. Convert grayscale or alpha images to RGB first."
            }
            HistogramError::InvalidAxisLimit { .. } => {
                "Pass a positive number for the y-axis limit, e.g. 5000."
            }
            HistogramError::BufferLayout { .. } | HistogramError::EmptyImage { .. } => {
                "The decoded image is malformed."
            }
            HistogramError::InvalidCanvasSize { .. } => {
                "Canvas must be between 320x240 and 8192x8192 pixels."
            }
            HistogramError::InvalidLineWidth { .. } => "Line width must be between 1 and 8 pixels.",
            HistogramError::FileNotFound { .. } => {
                "Check that the input file exists and is readable."
            }
            HistogramError::DecodeFailure { .. } => {
                "The input may be corrupted or in an unsupported format."
            }
            HistogramError::UnsupportedOutputFormat { .. } => {
                "Use one of: png, jpg, jpeg, bmp, tif, tiff, tga, qoi, webp, svg."
            }
            HistogramError::SinkWriteFailure { .. } => {
                "Check that the output directory exists and is writable."
            }
            HistogramError::StyleConfig { .. } => "Fix the JSON style file or remove --style.",
            HistogramError::EncodeFailure { .. } | HistogramError::Json { .. } => {
                "An unexpected error occurred while encoding the output."
            }
        }
    }

    /// Returns an error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            HistogramError::InvalidChannelCount { .. } => "INVALID_CHANNEL_COUNT",
            HistogramError::InvalidAxisLimit { .. } => "INVALID_AXIS_LIMIT",
            HistogramError::BufferLayout { .. } => "BUFFER_LAYOUT",
            HistogramError::EmptyImage { .. } => "EMPTY_IMAGE",
            HistogramError::InvalidCanvasSize { .. } => "INVALID_CANVAS_SIZE",
            HistogramError::InvalidLineWidth { .. } => "INVALID_LINE_WIDTH",
            HistogramError::FileNotFound { .. } => "FILE_NOT_FOUND",
            HistogramError::DecodeFailure { .. } => "DECODE_FAILURE",
            HistogramError::UnsupportedOutputFormat { .. } => "UNSUPPORTED_OUTPUT_FORMAT",
            HistogramError::EncodeFailure { .. } => "ENCODE_FAILURE",
            HistogramError::SinkWriteFailure { .. } => "SINK_WRITE_FAILURE",
            HistogramError::StyleConfig { .. } => "STYLE_CONFIG",
            HistogramError::Json { .. } => "JSON_ERROR",
        }
    }
}
