//! Configuration management for webimize
//!
//! Built-in defaults live here as named constants; a TOML config file and the
//! CLI flags layer on top of them (`Settings::resolve`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WebimizeError};

pub mod variants;
pub use variants::{Variant, VariantSpec};

/// Default JPEG encode quality
pub const DEFAULT_QUALITY: u8 = 85;

/// Default maximum output width in pixels
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// Project-relative root scanned by the batch walker
pub const DEFAULT_IMAGES_DIR: &str = "static/images";

/// Suffix appended to a file's full name to form its backup path
pub const BACKUP_SUFFIX: &str = ".backup";

/// Parameters for a single optimize pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    /// Maximum output width in pixels; wider images are downscaled to it
    pub max_width: u32,

    /// JPEG encode quality (1-100)
    pub quality: u8,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl OptimizeOptions {
    /// Create options with explicit width and quality
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self { max_width, quality }
    }

    /// Set the maximum width
    pub fn max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    /// Set the encode quality
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 {
            return Err(WebimizeError::invalid_parameters(
                "max width must be greater than 0",
            ));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(WebimizeError::invalid_parameters(format!(
                "quality must be between 1-100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// On-disk configuration file (TOML)
///
/// Every field is optional so a partial file overrides only what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for batch optimization
    pub images_dir: Option<PathBuf>,

    /// Default JPEG encode quality (1-100)
    pub quality: Option<u8>,

    /// Default maximum output width in pixels
    pub max_width: Option<u32>,

    /// Responsive variant spec; empty means the built-in small/medium/large
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        if !extension.eq_ignore_ascii_case("toml") {
            return Err(WebimizeError::config(
                "unsupported config file format, use .toml",
            ));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            WebimizeError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(quality) = self.quality {
            if quality == 0 || quality > 100 {
                return Err(WebimizeError::config(format!(
                    "quality must be between 1-100, got {quality}"
                )));
            }
        }

        if let Some(max_width) = self.max_width {
            if max_width == 0 {
                return Err(WebimizeError::config("max_width must be greater than 0"));
            }
        }

        if !self.variants.is_empty() {
            VariantSpec::new(self.variants.clone())
                .map_err(|e| WebimizeError::config(format!("invalid variant spec: {e}")))?;
        }

        Ok(())
    }
}

/// Effective settings after layering CLI flags over the config file over the
/// built-in defaults
#[derive(Debug, Clone)]
pub struct Settings {
    pub images_dir: PathBuf,
    pub quality: u8,
    pub max_width: u32,
    pub variants: VariantSpec,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            quality: DEFAULT_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
            variants: VariantSpec::default(),
        }
    }
}

impl Settings {
    /// Resolve settings: CLI quality beats config file beats defaults
    ///
    /// The `--max-width` flag is deliberately not part of resolution; it
    /// applies to single-file mode only and is layered on at the call site.
    /// The config file's `max_width` does shift the default for every mode.
    pub fn resolve(config: Option<&Config>, quality: Option<u8>) -> Self {
        let defaults = Settings::default();

        let images_dir = config
            .and_then(|c| c.images_dir.clone())
            .unwrap_or(defaults.images_dir);
        let quality = quality
            .or_else(|| config.and_then(|c| c.quality))
            .unwrap_or(defaults.quality);
        let max_width = config
            .and_then(|c| c.max_width)
            .unwrap_or(defaults.max_width);
        let variants = config
            .filter(|c| !c.variants.is_empty())
            // Validated by Config::validate, so construction cannot fail here
            .and_then(|c| VariantSpec::new(c.variants.clone()).ok())
            .unwrap_or(defaults.variants);

        Self {
            images_dir,
            quality,
            max_width,
            variants,
        }
    }

    /// Optimize options for single-file and batch modes
    pub fn optimize_options(&self) -> OptimizeOptions {
        OptimizeOptions::new(self.max_width, self.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_options() {
        let opts = OptimizeOptions::default();
        assert_eq!(opts.max_width, 800);
        assert_eq!(opts.quality, 85);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_options_validation() {
        assert!(OptimizeOptions::new(0, 85).validate().is_err());
        assert!(OptimizeOptions::new(800, 0).validate().is_err());
        assert!(OptimizeOptions::new(800, 101).validate().is_err());
        assert!(OptimizeOptions::new(1, 1).validate().is_ok());
        assert!(OptimizeOptions::new(800, 100).validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
images_dir = "assets/img"
quality = 70

[[variants]]
label = "thumb"
width = 200

[[variants]]
label = "full"
width = 1600
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.images_dir.as_deref(), Some(Path::new("assets/img")));
        assert_eq!(config.quality, Some(70));
        assert_eq!(config.max_width, None);
        assert_eq!(config.variants.len(), 2);
        assert_eq!(config.variants[0].label, "thumb");
        assert_eq!(config.variants[1].width, 1600);
    }

    #[test]
    fn test_config_rejects_non_toml() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_config_validation() {
        let config = Config {
            quality: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            max_width: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            variants: vec![
                Variant::new("small", 400),
                Variant::new("small", 800),
            ],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_settings_resolution_order() {
        let config = Config {
            quality: Some(70),
            max_width: Some(1024),
            ..Default::default()
        };

        // CLI quality wins over config; config max_width shifts the default
        let settings = Settings::resolve(Some(&config), Some(40));
        assert_eq!(settings.quality, 40);
        assert_eq!(settings.max_width, 1024);

        // Config wins over defaults
        let settings = Settings::resolve(Some(&config), None);
        assert_eq!(settings.quality, 70);

        // Defaults when nothing is given
        let settings = Settings::resolve(None, None);
        assert_eq!(settings.quality, DEFAULT_QUALITY);
        assert_eq!(settings.max_width, DEFAULT_MAX_WIDTH);
        assert_eq!(settings.images_dir, Path::new(DEFAULT_IMAGES_DIR));
        assert_eq!(settings.variants, VariantSpec::default());
    }

    #[test]
    fn test_settings_variant_override() {
        let config = Config {
            variants: vec![Variant::new("hero", 2000)],
            ..Default::default()
        };

        let settings = Settings::resolve(Some(&config), None);
        assert_eq!(settings.variants.len(), 1);
        assert_eq!(settings.variants.iter().next().unwrap().label, "hero");
    }
}
