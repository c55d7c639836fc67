//! Resize and re-encode images before they are sent to a provider.
//!
//! Providers bill and rate-limit by image size, and several reject formats
//! such as TIFF or BMP outright, so every upload is normalized to RGB and a
//! single well-supported format.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::config::ImageConfig;
use crate::error::PipelineError;

/// Normalizes decoded images into upload-ready bytes.
pub struct ImageEncoder {
    config: ImageConfig,
}

impl ImageEncoder {
    /// Create a new encoder with the given configuration.
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// Downscale so the longest edge fits `max_edge`, preserving aspect ratio.
    ///
    /// Images already within bounds are returned untouched; nothing is upscaled.
    pub fn resize(&self, image: DynamicImage) -> DynamicImage {
        let max_edge = self.config.max_edge;
        let (width, height) = image.dimensions();
        if max_edge == 0 || (width <= max_edge && height <= max_edge) {
            return image;
        }
        image.resize(max_edge, max_edge, FilterType::CatmullRom)
    }

    /// Encode as the configured output format.
    ///
    /// Alpha is dropped: JPEG has no alpha channel and models caption the
    /// visible content anyway.
    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, PipelineError> {
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut buffer = Vec::new();

        match self.output_format() {
            ImageFormat::Png => {
                rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
                    .map_err(|e| PipelineError::Encode(e.to_string()))?;
            }
            _ => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.config.jpeg_quality);
                rgb.write_with_encoder(encoder)
                    .map_err(|e| PipelineError::Encode(e.to_string()))?;
            }
        }

        Ok(buffer)
    }

    /// Format that `encode` produces.
    pub fn output_format(&self) -> ImageFormat {
        match self.config.format.as_str() {
            "png" => ImageFormat::Png,
            _ => ImageFormat::Jpeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(max_edge: u32, format: &str) -> ImageEncoder {
        ImageEncoder::new(ImageConfig {
            max_edge,
            format: format.to_string(),
            ..ImageConfig::default()
        })
    }

    #[test]
    fn test_resize_downscales_longest_edge() {
        let img = DynamicImage::new_rgb8(2000, 1000);
        let resized = encoder(500, "jpeg").resize(img);
        assert_eq!(resized.dimensions(), (500, 250));
    }

    #[test]
    fn test_resize_never_upscales() {
        let img = DynamicImage::new_rgb8(300, 200);
        let resized = encoder(1024, "jpeg").resize(img);
        assert_eq!(resized.dimensions(), (300, 200));
    }

    #[test]
    fn test_resize_disabled_with_zero() {
        let img = DynamicImage::new_rgb8(3000, 10);
        let resized = encoder(0, "jpeg").resize(img);
        assert_eq!(resized.dimensions(), (3000, 10));
    }

    #[test]
    fn test_encode_jpeg_signature() {
        let img = DynamicImage::new_rgba8(64, 64);
        let bytes = encoder(1024, "jpeg").encode(&img).unwrap();
        assert_eq!(&bytes[0..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_encode_png_signature() {
        let img = DynamicImage::new_rgb8(16, 16);
        let bytes = encoder(1024, "png").encode(&img).unwrap();
        assert_eq!(&bytes[0..4], &[0x89, b'P', b'N', b'G']);
    }
}
