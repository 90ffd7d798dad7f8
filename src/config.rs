use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the photo-kmz library.
///
/// Carries the overlay-size constant, the shared asset locations, and the
/// fixed internal archive entry name that used to be hard-coded process
/// state in earlier incarnations of this tool. The document assembler and
/// the archive packager both receive this value explicitly.
///
/// # Loading
///
/// ```rust,no_run
/// use photo_kmz::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.overlay_size = 0.0002;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Full edge length of the directional overlay box, in degrees.
    /// A small fixed marker footprint, not scaled by zoom or altitude.
    pub overlay_size: f64,
    /// Local path to the directional overlay icon. Packaged into the
    /// archive under its plain file name, only if the file exists.
    pub overlay_icon: PathBuf,
    /// Local path to the branding image embedded in each placemark
    /// description. Packaged like the overlay icon.
    pub branding_image: PathBuf,
    /// Remote icon href used for the point-marker style.
    pub marker_icon_href: String,
    /// Internal name of the markup document inside the archive.
    pub document_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlay_size: 0.0001,
            overlay_icon: PathBuf::from("fan.png"),
            branding_image: PathBuf::from("logo.png"),
            marker_icon_href: "http://maps.google.com/mapfiles/kml/paddle/blu-circle.png"
                .to_string(),
            document_name: "doc.kml".to_string(),
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Archive entry name for the overlay icon. The markup document and the
    /// container must agree on this name, so both derive it from here.
    pub fn overlay_icon_name(&self) -> String {
        file_entry_name(&self.overlay_icon)
    }

    /// Archive entry name for the branding image.
    pub fn branding_image_name(&self) -> String {
        file_entry_name(&self.branding_image)
    }
}

/// The flat-namespace entry name for a local asset: just its file name.
fn file_entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
