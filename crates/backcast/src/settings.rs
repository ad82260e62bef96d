//! CLI settings file
//!
//! ```yaml
//! data_dir: /srv/prices
//! engine:
//!   cache_enabled: true
//!   monte_carlo_batch_size: 250
//!   default_start_date: 2005-01-01
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use std::path::{Path, PathBuf};

use backcast_core::EngineConfig;
use color_eyre::eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};

/// Directory holding the settings file and, by default, price data
pub fn default_home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".backcast")
}

pub fn default_config_path() -> PathBuf {
    default_home_dir().join("config.yaml")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory of `<TICKER>.csv` price files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub engine: EngineConfig,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Load settings from `path`, falling back to defaults when the file does
    /// not exist. The engine section is validated before it is returned.
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let settings = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content)
                .map_err(|e| eyre!("{e}"))
                .wrap_err_with(|| format!("invalid settings file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file; using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(e)
                    .wrap_err_with(|| format!("failed to read settings file {}", path.display()));
            }
        };
        settings.engine.validate()?;
        Ok(settings)
    }

    /// Price directory: the command-line flag wins, then the settings file, then
    /// `~/.backcast/data`.
    pub fn resolve_data_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| default_home_dir().join("data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml(
            "engine:\n  monte_carlo_batch_size: 250\n  default_start_date: 2005-01-01\n",
        )
        .unwrap();
        assert_eq!(settings.engine.monte_carlo_batch_size, 250);
        assert_eq!(settings.engine.default_start_date, date(2005, 1, 1));
        assert_eq!(settings.engine.cache_ttl_secs, 86_400);
        assert_eq!(settings.data_dir, None);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "data_dir: /srv/prices\nengine:\n  cache_enabled: false\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.data_dir, Some(PathBuf::from("/srv/prices")));
        assert!(!settings.engine.cache_enabled);
        assert_eq!(
            settings.resolve_data_dir(None),
            PathBuf::from("/srv/prices")
        );
        assert_eq!(
            settings.resolve_data_dir(Some(Path::new("/tmp/other"))),
            PathBuf::from("/tmp/other")
        );
    }

    #[test]
    fn test_invalid_engine_section_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "engine:\n  monte_carlo_batch_size: 0\n").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
