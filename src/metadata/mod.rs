//! Embedded-tag reading for geolocation, capture time, and orientation.
//!
//! This module provides two entry points:
//!
//! - [`gps::extract`] — Read normalized GPS/heading/timestamp metadata, plus
//!   the raw rotation-tag value, from one image
//! - [`orientation::correct`] — Rotate an image to upright pixel orientation
//!   given that rotation-tag value
//!
//! Both degrade instead of failing: a missing or malformed tag produces a
//! default (or an absent result) plus a structured warning, never an error
//! that would abort a batch.

pub mod gps;
pub mod orientation;

pub use gps::{Extraction, ImageMetadata, extract};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Open an image file and parse its embedded tag table.
///
/// `Error::NotFound` means the file simply carries no tag table; any other
/// error is a genuine read or decode failure.
pub(crate) fn open_tag_table(path: &Path) -> Result<exif::Exif, exif::Error> {
    let file = File::open(path).map_err(exif::Error::Io)?;
    let mut reader = BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader)
}
