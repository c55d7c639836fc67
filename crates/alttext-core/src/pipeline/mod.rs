//! Image preparation pipeline.
//!
//! Stages run in order for every upload:
//! - **validate**: size limits and magic-byte check
//! - **decode**: format detection and decode on the blocking pool
//! - **orient**: apply the EXIF orientation tag
//! - **encode**: downscale and re-encode as JPEG or PNG
//! - **hash**: BLAKE3 content hash for log correlation
//! - **processor**: orchestrates the stages above
//!
//! **discovery** finds image files on disk for the `describe` command.

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod hash;
pub mod orient;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use encode::ImageEncoder;
pub use hash::Hasher;
pub use processor::{ImagePreparer, PreparedImage};
pub use validate::Validator;
