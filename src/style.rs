use crate::chart::{
    DEFAULT_HEIGHT, DEFAULT_LINE_WIDTH, DEFAULT_TITLE, DEFAULT_WIDTH, DEFAULT_X_LABEL,
    DEFAULT_Y_LABEL,
};
use crate::errors::{HistogramError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chart furniture that can be set from a JSON file or the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub line_width: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            x_label: DEFAULT_X_LABEL.to_string(),
            y_label: DEFAULT_Y_LABEL.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// Values given explicitly on the command line. `None` keeps the style's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOverrides {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub line_width: Option<u32>,
}

impl ChartStyle {
    /// Reads a style file. Missing fields take their defaults; unreadable or
    /// malformed files are errors.
    pub fn from_file(path: &Path) -> Result<Self> {
        let style_error = |message: String| HistogramError::StyleConfig {
            path: path.to_path_buf(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| style_error(e.to_string()))?;
        let style: ChartStyle =
            serde_json::from_str(&content).map_err(|e| style_error(e.to_string()))?;

        log::debug!("Loaded chart style from {}", path.display());
        Ok(style)
    }

    pub fn apply(mut self, overrides: StyleOverrides) -> Self {
        if let Some(title) = overrides.title {
            self.title = title;
        }
        if let Some(x_label) = overrides.x_label {
            self.x_label = x_label;
        }
        if let Some(y_label) = overrides.y_label {
            self.y_label = y_label;
        }
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if let Some(line_width) = overrides.line_width {
            self.line_width = line_width;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("style.json");
        std::fs::write(&path, r#"{ "title": "Sunset", "width": 800 }"#).unwrap();

        let style = ChartStyle::from_file(&path).unwrap();
        assert_eq!(style.title, "Sunset");
        assert_eq!(style.width, 800);
        assert_eq!(style.height, DEFAULT_HEIGHT);
        assert_eq!(style.x_label, "Color value");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("style.json");
        std::fs::write(&path, r#"{ "colour": "red" }"#).unwrap();

        match ChartStyle::from_file(&path) {
            Err(HistogramError::StyleConfig { path: p, message }) => {
                assert_eq!(p, path);
                assert!(message.contains("colour"));
            }
            other => panic!("expected StyleConfig error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let err = ChartStyle::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.error_code(), "STYLE_CONFIG");
    }

    #[test]
    fn test_overrides_win() {
        let style = ChartStyle::default().apply(StyleOverrides {
            title: Some("Night".to_string()),
            line_width: Some(2),
            ..Default::default()
        });

        assert_eq!(style.title, "Night");
        assert_eq!(style.line_width, 2);
        assert_eq!(style.y_label, "Pixel count");
        assert_eq!(style.width, DEFAULT_WIDTH);
    }
}
