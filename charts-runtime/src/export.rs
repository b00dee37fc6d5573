//! Image export of a rendered chart.

use std::path::{Path, PathBuf};

use base64::Engine;

use crate::{ChartError, ChartResult};

const PNG_EXTENSION: &str = ".png";

/// A captured chart image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// Suggested download name, always ending in `.png`.
    pub filename: String,
    /// MIME type from the capture.
    pub mime: String,
    /// Decoded image bytes.
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    /// Decode a `data:<mime>;base64,<payload>` capture.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Export`] if the URL is not base64 data.
    pub fn from_data_url(data_url: &str, filename: &str) -> ChartResult<Self> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| ChartError::Export("capture is not a data URL".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ChartError::Export("data URL has no payload".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ChartError::Export("data URL is not base64 encoded".to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ChartError::Export(e.to_string()))?;

        Ok(Self {
            filename: png_filename(filename),
            mime: if mime.is_empty() { "image/png" } else { mime }.to_string(),
            bytes,
        })
    }

    /// Write the image into `dir` under its filename.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Export`] if the file cannot be written.
    pub fn write_to(&self, dir: &Path) -> ChartResult<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)
            .map_err(|e| ChartError::Export(format!("{}: {e}", path.display())))?;
        tracing::debug!("Wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

/// Append `.png` unless the name already ends with it.
#[must_use]
pub fn png_filename(filename: &str) -> String {
    if filename.to_ascii_lowercase().ends_with(PNG_EXTENSION) {
        filename.to_string()
    } else {
        format!("{filename}{PNG_EXTENSION}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG.
    const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn filename_gets_png_suffix() {
        assert_eq!(png_filename("sales"), "sales.png");
        assert_eq!(png_filename("sales.png"), "sales.png");
        assert_eq!(png_filename("SALES.PNG"), "SALES.PNG");
        assert_eq!(png_filename("sales.jpg"), "sales.jpg.png");
    }

    #[test]
    fn decodes_png_data_url() {
        let url = format!("data:image/png;base64,{PIXEL}");
        let image = ExportedImage::from_data_url(&url, "chart").expect("decode");
        assert_eq!(image.filename, "chart.png");
        assert_eq!(image.mime, "image/png");
        assert_eq!(&image.bytes[1..4], b"PNG");
    }

    #[test]
    fn rejects_malformed_captures() {
        for url in [
            "image/png;base64,AAAA",
            "data:image/png;base64",
            "data:image/svg+xml,<svg/>",
            "data:image/png;base64,!!!",
        ] {
            assert!(
                matches!(ExportedImage::from_data_url(url, "x"), Err(ChartError::Export(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("data:image/png;base64,{PIXEL}");
        let image = ExportedImage::from_data_url(&url, "out").expect("decode");
        let path = image.write_to(dir.path()).expect("write");
        assert_eq!(path, dir.path().join("out.png"));
        assert_eq!(std::fs::read(path).expect("read"), image.bytes);
    }
}
