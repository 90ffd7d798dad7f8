//! KMZ packaging: one markup document plus its referenced assets in a
//! single compressed container with a flat internal namespace.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::Config;

/// Bundle the markup document, the corrected images, and the shared assets
/// into a KMZ file at `output`.
///
/// Entry names must match the references inside the document exactly: the
/// markup goes in under `config.document_name`, each image under its
/// original file name, and the two shared assets under their plain file
/// names — each at most once, and only if the source file exists. The
/// temporary markup file is removed after packaging.
///
/// The container is staged in the output's directory and only moved to
/// `output` once complete, so a failed run leaves nothing at the
/// requested path.
pub fn write_kmz(
    output: &Path,
    kml_file: &Path,
    images: &[(String, PathBuf)],
    config: &Config,
) -> Result<()> {
    let staging_dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(staging_dir).with_context(|| {
        format!(
            "Failed to create a staging file in {}",
            staging_dir.display()
        )
    })?;
    let mut kmz = ZipWriter::new(staged);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_entry(&mut kmz, &config.document_name, kml_file, options)?;

    for (name, path) in images {
        add_entry(&mut kmz, name, path, options)?;
    }

    if config.overlay_icon.exists() {
        add_entry(&mut kmz, &config.overlay_icon_name(), &config.overlay_icon, options)?;
    }
    if config.branding_image.exists() {
        add_entry(
            &mut kmz,
            &config.branding_image_name(),
            &config.branding_image,
            options,
        )?;
    }

    let staged = kmz.finish().context("Failed to finalize archive")?;
    staged
        .persist(output)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to move archive into place at {}", output.display()))?;

    fs::remove_file(kml_file).with_context(|| {
        format!(
            "Failed to remove temporary markup file {}",
            kml_file.display()
        )
    })?;

    Ok(())
}

fn add_entry(
    kmz: &mut ZipWriter<NamedTempFile>,
    name: &str,
    source: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    let bytes =
        fs::read(source).with_context(|| format!("Failed to read {}", source.display()))?;
    kmz.start_file(name, options)
        .with_context(|| format!("Failed to add archive entry {name}"))?;
    kmz.write_all(&bytes)
        .with_context(|| format!("Failed to write archive entry {name}"))?;
    Ok(())
}
