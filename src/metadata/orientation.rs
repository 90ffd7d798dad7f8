use image::DynamicImage;

/// Rotate an image to upright pixel orientation given its raw rotation-tag
/// value, expanding the canvas as needed.
///
/// Only the three pure-rotation tag values are handled: 3 (upside down),
/// 6 (rotated 90° clockwise in the file), and 8 (rotated 90° counter-
/// clockwise). Any other value — including the mirrored variants and an
/// absent tag — leaves the pixels untouched.
pub fn correct(image: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(3) => image.rotate180(),
        Some(6) => image.rotate90(),
        Some(8) => image.rotate270(),
        _ => image,
    }
}
