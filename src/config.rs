//! Dashboard Configuration Module
//! Resolves input paths, delimiter and date format from defaults,
//! an optional JSON file and command-line paths.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(String),
    #[error("Usage: bike_dashboard [--config FILE] [DAY_CSV HOUR_CSV]")]
    Usage,
}

/// Where the two datasets live and how they are encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub day_path: PathBuf,
    pub hour_path: PathBuf,
    pub delimiter: String,
    /// chrono format string for the `dteday` column.
    pub date_format: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            day_path: PathBuf::from("Data/day.csv"),
            hour_path: PathBuf::from("Data/hour.csv"),
            delimiter: ";".to_string(),
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.delimiter_byte()?;
        Ok(config)
    }

    /// Build the config from command-line arguments (program name excluded).
    ///
    /// Accepted shapes: `[--config FILE] [DAY_CSV HOUR_CSV]`.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config_path: Option<PathBuf> = None;
        let mut positional: Vec<PathBuf> = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                let value = args.next().ok_or(ConfigError::Usage)?;
                config_path = Some(PathBuf::from(value));
            } else if arg.starts_with("--") {
                return Err(ConfigError::Usage);
            } else {
                positional.push(PathBuf::from(arg));
            }
        }

        let mut config = match config_path {
            Some(path) => Self::load(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        match positional.len() {
            0 => {}
            2 => {
                config.hour_path = positional.pop().ok_or(ConfigError::Usage)?;
                config.day_path = positional.pop().ok_or(ConfigError::Usage)?;
            }
            _ => return Err(ConfigError::Usage),
        }

        config.delimiter_byte()?;
        Ok(config)
    }

    /// Same config pointed at `day.csv` / `hour.csv` inside `dir`.
    pub fn with_data_dir(&self, dir: &Path) -> Self {
        Self {
            day_path: dir.join("day.csv"),
            hour_path: dir.join("hour.csv"),
            ..self.clone()
        }
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(ConfigError::InvalidDelimiter(self.delimiter.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_match_the_bundled_dataset_layout() {
        let config = DashboardConfig::default();
        assert_eq!(config.day_path, PathBuf::from("Data/day.csv"));
        assert_eq!(config.hour_path, PathBuf::from("Data/hour.csv"));
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.date_format, "%d/%m/%Y");
    }

    #[test]
    fn json_file_overrides_only_given_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "delimiter": ",", "day_path": "other/day.csv" }}"#).unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert_eq!(config.day_path, PathBuf::from("other/day.csv"));
        assert_eq!(config.hour_path, PathBuf::from("Data/hour.csv"));
    }

    #[test]
    fn positional_paths_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "day_path": "cfg/day.csv", "hour_path": "cfg/hour.csv" }}"#).unwrap();
        let config_path = file.path().to_string_lossy().to_string();

        let config =
            DashboardConfig::from_args(args(&["--config", &config_path, "a.csv", "b.csv"]))
                .unwrap();
        assert_eq!(config.day_path, PathBuf::from("a.csv"));
        assert_eq!(config.hour_path, PathBuf::from("b.csv"));
    }

    #[test]
    fn single_positional_path_is_a_usage_error() {
        let err = DashboardConfig::from_args(args(&["only.csv"])).unwrap_err();
        assert!(matches!(err, ConfigError::Usage));
        let err = DashboardConfig::from_args(args(&["--verbose"])).unwrap_err();
        assert!(matches!(err, ConfigError::Usage));
    }

    #[test]
    fn multi_byte_delimiter_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "delimiter": ";;" }}"#).unwrap();

        let err = DashboardConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDelimiter(_)));
    }

    #[test]
    fn data_dir_points_at_both_files() {
        let config = DashboardConfig::default().with_data_dir(Path::new("/srv/bikes"));
        assert_eq!(config.day_path, PathBuf::from("/srv/bikes/day.csv"));
        assert_eq!(config.hour_path, PathBuf::from("/srv/bikes/hour.csv"));
        assert_eq!(config.delimiter, ";");
    }
}
