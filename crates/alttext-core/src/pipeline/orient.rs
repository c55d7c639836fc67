//! EXIF orientation handling.
//!
//! Phone cameras store pixels in sensor order and record the intended
//! rotation in the `Orientation` tag. Vision models see raw pixels, so the
//! rotation is applied before the image is re-encoded.

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::io::Cursor;

/// Read the EXIF orientation (1-8) from encoded image bytes.
///
/// Returns `None` if the image has no EXIF data or no orientation tag.
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    match &field.value {
        Value::Short(v) => v.first().map(|&x| x as u32),
        Value::Long(v) => v.first().copied(),
        _ => None,
    }
}

/// Rotate/flip an image so it displays upright for the given orientation.
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
