//! Configuration management.

mod io;

pub use io::{ConfigFileIo, IoConfig};

use crate::observability::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for tabgraph.
#[derive(Debug, Clone, Default)]
pub struct TabgraphConfig {
    /// File naming and CSV dialect.
    pub io: IoConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format.
    pub format: LogFormat,
    /// Filter directive (e.g. `info`, `tabgraph=debug`). `RUST_LOG` wins.
    pub level: Option<String>,
    /// Optional log file; stderr when absent.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// I/O section.
    pub io: Option<ConfigFileIo>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl TabgraphConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting I/O tokens are invalid.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the I/O tokens are invalid.
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let config = Self::from_config_file(file);
        config.io.validate()?;
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/tabgraph/` on macOS)
    /// 2. XDG config dir (`~/.config/tabgraph/` for Unix compatibility)
    ///
    /// Returns default configuration if no usable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("tabgraph").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("tabgraph")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unusable config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `TabgraphConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(io) = file.io {
            config.io = config.io.with_overrides(io);
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.level = logging.level;
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config
    }
}
