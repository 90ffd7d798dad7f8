//! The conversion pipeline: enumerate candidates, extract metadata, correct
//! orientation, assemble the document, and package the archive.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::archive;
use crate::config::Config;
use crate::error::ConvertError;
use crate::geometry::OverlayBox;
use crate::kml::KmlDocument;
use crate::metadata::{self, orientation};

/// Supported image extensions, matched case-insensitively.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Summary of one completed conversion run.
///
/// `packaged_images` holds the archive entry names of every photo that made
/// it into the document — the run fails before producing this value when
/// the list would be empty. `warnings` aggregates every degraded field and
/// per-image read failure encountered along the way.
#[derive(Debug)]
pub struct ConversionReport {
    /// Entry names of the corrected images included in the archive.
    pub packaged_images: Vec<String>,
    /// File names of candidates excluded for lack of usable GPS data.
    pub skipped: Vec<String>,
    /// Non-fatal problems encountered while processing individual images.
    pub warnings: Vec<String>,
    /// Where the archive was written.
    pub output: PathBuf,
}

/// Collect candidate images from the input directory.
///
/// Only direct children with a JPEG/PNG extension are considered, and the
/// result is sorted lexically by file name so placemark ordering in the
/// output does not depend on platform enumeration order.
pub fn collect_images(dir: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
        .map(|e| e.into_path())
        .collect();
    images.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Convert a directory of geotagged photos into a KMZ archive at `output`.
///
/// This is the main entry point for the library. For every candidate image
/// it extracts GPS metadata, and — only on success — saves an upright copy
/// of the image, computes the directional-overlay box, and appends the
/// overlay + placemark pair to the document. Images without usable data are
/// skipped; the run only fails when *no* image produces data
/// ([`ConvertError::NoValidGpsData`]) or on an unrecoverable I/O fault.
/// Either a complete archive is written or none at all.
///
/// Intermediate files live in a temporary workspace that is removed when
/// the run ends, on success and failure alike.
///
/// # Example
///
/// ```rust,no_run
/// use photo_kmz::config::Config;
/// use photo_kmz::pipeline::convert;
/// use std::path::Path;
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::default();
/// let report = convert(Path::new("./photos"), Path::new("site.kmz"), &config)?;
/// println!("Packaged {} photo(s)", report.packaged_images.len());
/// # Ok(())
/// # }
/// ```
pub fn convert(input_dir: &Path, output: &Path, config: &Config) -> Result<ConversionReport> {
    let candidates = collect_images(input_dir);
    log::info!(
        "Found {} candidate image(s) in {}",
        candidates.len(),
        input_dir.display()
    );

    let workspace = tempfile::tempdir().context("Failed to create temporary workspace")?;

    let mut document = KmlDocument::new(config);
    let mut packaged: Vec<(String, PathBuf)> = Vec::new();
    let mut skipped = Vec::new();
    let mut warnings = Vec::new();

    for path in &candidates {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extraction = metadata::extract(path);
        for warning in &extraction.warnings {
            log::warn!("{warning}");
        }
        warnings.extend(extraction.warnings);

        let Some(meta) = extraction.metadata else {
            log::debug!("Skipping {name}: no usable GPS data");
            skipped.push(name);
            continue;
        };

        let corrected_path = match save_corrected_image(
            path,
            &name,
            workspace.path(),
            extraction.orientation,
        ) {
            Ok(p) => p,
            Err(err) => {
                log::warn!("Skipping {name}: {err:#}");
                warnings.push(format!("{err:#}"));
                skipped.push(name);
                continue;
            }
        };

        let overlay = OverlayBox::from_center(
            meta.latitude,
            meta.longitude,
            meta.heading,
            config.overlay_size,
        );
        document.add_photo(&name, &meta, &overlay);
        packaged.push((name, corrected_path));
    }

    if packaged.is_empty() {
        return Err(ConvertError::NoValidGpsData.into());
    }

    log::info!(
        "Assembled document with {} placemark(s), {} image(s) skipped",
        document.photo_count(),
        skipped.len()
    );

    let kml_path = workspace.path().join(&config.document_name);
    fs::write(&kml_path, document.to_xml()?)
        .with_context(|| format!("Failed to write markup document to {}", kml_path.display()))?;

    archive::write_kmz(output, &kml_path, &packaged, config)?;
    log::info!("Archive written to {}", output.display());

    Ok(ConversionReport {
        packaged_images: packaged.into_iter().map(|(name, _)| name).collect(),
        skipped,
        warnings,
        output: output.to_path_buf(),
    })
}

/// Decode one image, rotate it upright, and save the copy into the
/// temporary workspace under its original file name. The rotation-tag
/// value comes from the extraction pass, which already parsed the table.
fn save_corrected_image(
    path: &Path,
    name: &str,
    workspace: &Path,
    orientation: Option<u32>,
) -> Result<PathBuf> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    let corrected = orientation::correct(image, orientation);

    let corrected_path = workspace.join(name);
    corrected
        .save(&corrected_path)
        .with_context(|| format!("Failed to save corrected copy of {name}"))?;
    Ok(corrected_path)
}
