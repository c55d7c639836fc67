//! Pipeline orchestration - turns raw upload bytes into a provider-ready image.

use image::GenericImageView;

use crate::config::Config;
use crate::error::PipelineError;

use super::decode::{format_to_string, ImageDecoder};
use super::encode::ImageEncoder;
use super::hash::Hasher;
use super::orient;
use super::validate::Validator;

/// An image that has been validated, decoded, oriented, resized and re-encoded.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Encoded bytes sent to the provider
    pub bytes: Vec<u8>,
    /// Format of `bytes` ("jpeg" or "png")
    pub format: String,
    /// Width after orientation and resize
    pub width: u32,
    /// Height after orientation and resize
    pub height: u32,
    /// Format detected in the upload
    pub source_format: String,
    /// Width of the upload as decoded
    pub source_width: u32,
    /// Height of the upload as decoded
    pub source_height: u32,
    /// Size of the upload in bytes
    pub source_size: u64,
    /// BLAKE3 hash of the upload
    pub content_hash: String,
}

/// Runs the validate → decode → orient → resize → encode stages.
pub struct ImagePreparer {
    validator: Validator,
    decoder: ImageDecoder,
    encoder: ImageEncoder,
    apply_orientation: bool,
}

impl ImagePreparer {
    /// Create a new preparer with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            encoder: ImageEncoder::new(config.image.clone()),
            apply_orientation: config.image.apply_orientation,
        }
    }

    /// Prepare uploaded bytes for a provider call.
    pub async fn prepare(&self, bytes: Vec<u8>) -> Result<PreparedImage, PipelineError> {
        let start = std::time::Instant::now();

        self.validator.validate(&bytes)?;
        let content_hash = Hasher::content_hash(&bytes);
        let orientation = if self.apply_orientation {
            orient::read_orientation(&bytes)
        } else {
            None
        };

        let decoded = self.decoder.decode_from_bytes(bytes).await?;
        let source_format = format_to_string(decoded.format);
        let (source_width, source_height, source_size) =
            (decoded.width, decoded.height, decoded.file_size);

        let mut image = decoded.image;
        if let Some(orientation) = orientation {
            image = orient::apply_orientation(image, orientation);
        }
        let image = self.encoder.resize(image);
        let (width, height) = image.dimensions();
        let encoded = self.encoder.encode(&image)?;

        tracing::debug!(
            hash = &content_hash[..12],
            source_format = %source_format,
            source_width,
            source_height,
            width,
            height,
            encoded_bytes = encoded.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prepared image"
        );

        Ok(PreparedImage {
            bytes: encoded,
            format: format_to_string(self.encoder.output_format()),
            width,
            height,
            source_format,
            source_width,
            source_height,
            source_size,
            content_hash,
        })
    }
}
