use crate::errors::{HistogramError, Result};
use crate::pixels::DecodedImage;
use image::DynamicImage;
use std::path::Path;

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(HistogramError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let image = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| HistogramError::DecodeFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .decode()
        .map_err(|e| HistogramError::DecodeFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    log::debug!(
        "Decoded {}: {}x{} {:?}",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

impl DecodedImage {
    /// Decodes `path`, keeping the file's channel count.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_dynamic(load_image(path)?)
    }
}
