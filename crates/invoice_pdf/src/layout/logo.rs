//! Header images
//!
//! Logos are decoded with the `image` codecs `printpdf` re-exports, which
//! handle grayscale, RGB and Adobe CMYK JPEGs alike.

use std::fmt;
use std::path::Path;

use printpdf::image_crate::{self, DynamicImage, GenericImageView, ImageFormat};

use crate::error::RenderError;

/// A decoded JPEG ready to embed
#[derive(Clone)]
pub struct JpegImage {
    data: Vec<u8>,
    image: DynamicImage,
}

impl JpegImage {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RenderError> {
        let image = image_crate::load_from_memory_with_format(&data, ImageFormat::Jpeg)
            .map_err(|e| RenderError::Image(e.to_string()))?;
        Ok(Self { data, image })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| RenderError::Image(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.dimensions().0
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.dimensions().1
    }

    pub(crate) fn decoded(&self) -> &DynamicImage {
        &self.image
    }
}

impl PartialEq for JpegImage {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl fmt::Debug for JpegImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JpegImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGO: &[u8] = include_bytes!("../../tests/fixtures/logo.jpg");

    #[test]
    fn test_decodes_dimensions() {
        let image = JpegImage::from_bytes(LOGO.to_vec()).unwrap();
        assert_eq!((image.width(), image.height()), (16, 16));
    }

    #[test]
    fn test_rejects_other_data() {
        let result = JpegImage::from_bytes(b"GIF89a".to_vec());
        assert!(matches!(result, Err(RenderError::Image(_))));
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = JpegImage::open("/nonexistent/logo.jpg").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/logo.jpg"));
    }
}
