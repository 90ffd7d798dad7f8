use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use photo_kmz::{config, error::ConvertError, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "photo-kmz",
    version,
    about = "Convert geotagged JPEG/PNG photos into a KMZ archive with directional overlays and annotated placemarks"
)]
struct Cli {
    /// Directory containing geotagged images
    #[arg(value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Output archive path
    #[arg(value_name = "OUTPUT_KMZ", default_value = "photos.kmz")]
    output: PathBuf,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let Some(input) = cli.input else {
        anyhow::bail!("No input directory specified. Use --help for usage.");
    };
    if !input.is_dir() {
        anyhow::bail!("Input path {} is not a directory.", input.display());
    }

    let config = config::Config::load(cli.config.as_deref())?;

    match pipeline::convert(&input, &cli.output, &config) {
        Ok(report) => {
            if !report.warnings.is_empty() {
                log::info!("{} warning(s) during processing", report.warnings.len());
            }
            log::info!(
                "Done: {} photo(s) packaged, {} skipped",
                report.packaged_images.len(),
                report.skipped.len()
            );
            println!("Archive written to {}", report.output.display());
            Ok(())
        }
        Err(err) => {
            if err.downcast_ref::<ConvertError>() == Some(&ConvertError::NoValidGpsData) {
                anyhow::bail!(
                    "None of the images in {} carry usable GPS metadata — nothing to map.",
                    input.display()
                );
            }
            Err(err)
        }
    }
}
