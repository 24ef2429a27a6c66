//! Configuration of a table bake.
use bxdf::BrdfKind;
use ltc::{FitError, FloatFormat, LtcFitConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised by the command line front end.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("{msg} {}: {source}", .path.display())]
    Io {
        msg: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML or has unknown values.
    #[error("Failed to parse configuration file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// The fit itself failed.
    #[error(transparent)]
    Fit(#[from] FitError),
}

impl Error {
    pub fn from_io_error(source: std::io::Error, msg: &'static str, path: &Path) -> Self {
        Self::Io {
            msg,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Everything needed to bake a pair of LTC textures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// BRDF model to fit.
    pub brdf: BrdfKind,
    /// Float format of the exported textures.
    pub format: FloatFormat,
    /// Directory receiving `ltc_1.bin` and `ltc_2.bin`.
    pub output_dir: PathBuf,
    /// Grid and optimiser settings.
    pub fit: LtcFitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brdf: BrdfKind::default(),
            format: FloatFormat::default(),
            output_dir: PathBuf::from("."),
            fit: LtcFitConfig::default(),
        }
    }
}

impl Config {
    /// Loads a [`Config`] from a .toml file.
    ///
    /// A relative output directory is resolved against the directory of the
    /// file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        log::info!("Loading configurations from {}", path.display());
        let string = std::fs::read_to_string(path)
            .map_err(|err| Error::from_io_error(err, "Failed to read configuration file", path))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::parse(&string, base).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("    - BRDF: {}", config.brdf);
        log::info!("    - Output directory: {}", config.output_dir.display());
        log::info!("    - Format: {}", config.format);
        Ok(config)
    }

    fn parse(string: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(string)?;
        if config.output_dir.is_relative() {
            config.output_dir = base.join(&config.output_dir);
        }
        Ok(config)
    }
}
