//! # photo-kmz
//!
//! Convert a batch of geotagged JPEG/PNG photos into a single KMZ archive
//! for map viewers: one directional ground overlay and one annotated
//! placemark per photo, with the upright-corrected images packaged
//! alongside the markup document.
//!
//! ## Quick Start
//!
//! The simplest way to use the library is through the pipeline module,
//! which handles the full extract → assemble → package flow:
//!
//! ```rust,no_run
//! use photo_kmz::config::Config;
//! use photo_kmz::pipeline::convert;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!
//!     let report = convert(Path::new("./photos"), Path::new("site.kmz"), &config)?;
//!
//!     println!("Packaged {} photo(s)", report.packaged_images.len());
//!     for warning in &report.warnings {
//!         eprintln!("warning: {warning}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! For more control, the extractor, geometry calculator, and document
//! assembler can be driven individually:
//!
//! ```rust,no_run
//! use photo_kmz::config::Config;
//! use photo_kmz::geometry::OverlayBox;
//! use photo_kmz::kml::KmlDocument;
//! use photo_kmz::metadata;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let mut doc = KmlDocument::new(&config);
//!
//!     let extraction = metadata::extract(Path::new("photo.jpg"));
//!     if let Some(meta) = extraction.metadata {
//!         let overlay = OverlayBox::from_center(
//!             meta.latitude,
//!             meta.longitude,
//!             meta.heading,
//!             config.overlay_size,
//!         );
//!         doc.add_photo("photo.jpg", &meta, &overlay);
//!     }
//!
//!     println!("{}", doc.to_xml()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Error model
//!
//! Field-level and image-level problems never abort a batch — they degrade
//! to defaults or exclusions and surface as structured warnings. Only two
//! conditions fail a run: zero usable images
//! ([`error::ConvertError::NoValidGpsData`]) and unrecoverable I/O faults.
//! A run leaves behind either a complete archive or no archive at all.
//!
//! ## Modules
//!
//! - [`metadata`] — GPS/timestamp extraction and orientation correction
//! - [`geometry`] — directional-overlay bounding boxes
//! - [`kml`] — markup document assembly
//! - [`archive`] — KMZ packaging
//! - [`pipeline`] — the end-to-end conversion driver
//! - [`config`] — overlay size, asset locations, and archive entry names
//! - [`error`] — classified run-aborting errors

pub mod archive;
pub mod config;
pub mod error;
pub mod geometry;
pub mod kml;
pub mod metadata;
pub mod pipeline;
