//! Configuration files
//!
//! Any serde type with a `Default` can be read from and written to `.toml` or
//! `.ron`; the format follows the file extension.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// On-disk configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from the extension of `path`
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn deserialize<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    fn serialize<T: Serialize>(self, value: &T) -> Result<String, ConfigError> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string())),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// Serializable configuration with a range check
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Reject values that parse but cannot be used
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Read, parse and validate a configuration file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(path, &contents)?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text; `path` only selects the format
    fn parse(path: impl AsRef<Path>, contents: &str) -> Result<Self, ConfigError> {
        ConfigFormat::from_path(path.as_ref())?.deserialize(contents)
    }

    /// Write the configuration in the format named by the extension
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = ConfigFormat::from_path(path)?.serialize(self)?;
        std::fs::write(path, contents)?;
        log::debug!("Saved configuration to {}", path.display());
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value was parsed but is outside its allowed range
    #[error("Invalid configuration value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        level: u32,
    }

    impl Config for Sample {
        fn validate(&self) -> Result<(), ConfigError> {
            if self.level > 10 {
                return Err(ConfigError::Invalid {
                    field: "level",
                    reason: format!("{} exceeds 10", self.level),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.toml")).ok(), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(Path::new("b.ron")).ok(), Some(ConfigFormat::Ron));
        assert!(matches!(
            ConfigFormat::from_path(Path::new("b.json")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(ConfigFormat::from_path(Path::new("toml")).is_err());
    }

    #[test]
    fn test_save_then_load_validates() {
        let dir = std::env::temp_dir().join(format!("deferred_engine_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("sample.ron");

        let sample = Sample { name: "lights".to_string(), level: 3 };
        sample.save_to_file(&path).expect("save");
        assert_eq!(Sample::load_from_file(&path).expect("load"), sample);

        Sample { level: 11, ..Sample::default() }.save_to_file(&path).expect("save");
        assert!(matches!(Sample::load_from_file(&path), Err(ConfigError::Invalid { field: "level", .. })));

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Sample::load_from_file("/nonexistent/deferred_engine/sample.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
