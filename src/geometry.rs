//! Bounding-box geometry for the directional ground overlay.

/// A rectangular geographic box with a rotation, used to position the
/// directional overlay icon around a photo's coordinate.
///
/// All values are in degrees. The box is recomputed per image and only
/// lives long enough to be written into the KML document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    /// Rotation applied to the overlay icon. Always `-|heading|` — the
    /// legacy behavior rotates clockwise-negative regardless of the sign
    /// of the source bearing, and is preserved here for compatibility.
    pub rotation: f64,
}

impl OverlayBox {
    /// Build the box for a fixed-size overlay centered on `(latitude, longitude)`.
    ///
    /// `size` is the full edge length of the box on both axes, so each edge
    /// sits `size / 2` away from the center.
    ///
    /// # Example
    ///
    /// ```rust
    /// use photo_kmz::geometry::OverlayBox;
    ///
    /// let b = OverlayBox::from_center(40.446, -79.982, 45.0, 0.0001);
    /// assert_eq!(b.rotation, -45.0);
    /// assert!((b.north - b.south - 0.0001).abs() < 1e-12);
    /// ```
    pub fn from_center(latitude: f64, longitude: f64, heading: f64, size: f64) -> Self {
        let half = size / 2.0;
        Self {
            north: latitude + half,
            south: latitude - half,
            east: longitude + half,
            west: longitude - half,
            rotation: -heading.abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn box_edges_span_the_configured_size() {
        let b = OverlayBox::from_center(40.0, -79.0, 0.0, 0.0001);
        assert!((b.north - b.south - 0.0001).abs() < TOLERANCE);
        assert!((b.east - b.west - 0.0001).abs() < TOLERANCE);
    }

    #[test]
    fn box_is_centered_on_the_input_coordinate() {
        let b = OverlayBox::from_center(40.446111, -79.982222, 0.0, 0.0001);
        assert!(((b.north + b.south) / 2.0 - 40.446111).abs() < TOLERANCE);
        assert!(((b.east + b.west) / 2.0 - -79.982222).abs() < TOLERANCE);
    }

    #[test]
    fn rotation_is_never_positive() {
        for heading in [-270.0, -45.0, 0.0, 45.0, 359.9] {
            let b = OverlayBox::from_center(0.0, 0.0, heading, 0.0001);
            assert!(b.rotation <= 0.0, "heading {heading} gave {}", b.rotation);
            assert_eq!(b.rotation, -heading.abs());
        }
    }

    #[test]
    fn negative_heading_rotates_the_same_as_positive() {
        let pos = OverlayBox::from_center(0.0, 0.0, 45.0, 0.0001);
        let neg = OverlayBox::from_center(0.0, 0.0, -45.0, 0.0001);
        assert_eq!(pos.rotation, neg.rotation);
        assert_eq!(pos.rotation, -45.0);
    }
}
