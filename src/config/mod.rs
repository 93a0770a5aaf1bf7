pub mod paths;

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::StudyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(StudyError::new(
                format!("Unknown log format '{}'", other),
                "config"
            )),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub data_path: PathBuf,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            data_path: paths::default_document_path(),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

/// Where the configuration came from. Loading runs before logging is set up,
/// so this is reported afterwards with [`ConfigSource::log`].
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    Invalid(PathBuf, StudyError),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => tracing::info!(path = ?path, "Loaded config file"),
            ConfigSource::Missing(path) => {
                tracing::debug!(path = ?path, "No config file, using defaults")
            }
            ConfigSource::Invalid(path, e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to parse config file, using defaults")
            }
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (`STUDYPATH_CONFIG` or the data dir), then
    /// `STUDYPATH_*` environment overrides.
    pub fn load() -> Result<(Self, ConfigSource), StudyError> {
        let path = std::env::var_os("STUDYPATH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(paths::default_config_path);

        let (mut config, source) = Self::from_file(&path);
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok((config, source))
    }

    /// Read a TOML config file. A missing or unparseable file yields defaults.
    pub fn from_file(path: &Path) -> (Self, ConfigSource) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return (Config::default(), ConfigSource::Missing(path.to_path_buf())),
        };
        match Self::from_toml(&content) {
            Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
            Err(e) => {
                let e = e.with_context(format!("path: {:?}", path));
                (Config::default(), ConfigSource::Invalid(path.to_path_buf(), e))
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, StudyError> {
        Ok(toml::from_str::<Config>(content)?)
    }

    /// Apply `STUDYPATH_*` overrides from a key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), StudyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("STUDYPATH_LISTEN_ADDR") {
            self.listen_addr = addr.trim().parse().map_err(|e| {
                StudyError::new(format!("Invalid listen address '{}': {}", addr, e), "config")
            })?;
        }
        if let Some(path) = lookup("STUDYPATH_DATA_PATH") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("STUDYPATH_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(format) = lookup("STUDYPATH_LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            listen_addr = "0.0.0.0:8080"
            log_format = "pretty"
            "#,
        )
        .unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = Config::from_toml("listen_addr = 12").unwrap_err();
        assert_eq!(err.stage, "config");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, source) = Config::from_file(&dir.path().join("absent.toml"));
        assert_eq!(config.listen_addr, Config::default().listen_addr);
        assert!(matches!(source, ConfigSource::Missing(_)));
    }

    #[test]
    fn unparseable_file_reports_why_defaults_were_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studypath.toml");
        fs::write(&path, "listen_addr = [oops").unwrap();

        let (config, source) = Config::from_file(&path);
        assert_eq!(config.listen_addr, Config::default().listen_addr);
        match source {
            ConfigSource::Invalid(p, e) => {
                assert_eq!(p, path);
                assert_eq!(e.stage, "config");
                assert!(e.context.is_some());
            }
            other => panic!("expected an invalid source, got {other:?}"),
        }
    }

    #[test]
    fn readable_file_is_reported_as_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studypath.toml");
        fs::write(&path, "log_level = \"debug\"").unwrap();

        let (config, source) = Config::from_file(&path);
        assert_eq!(config.log_level, "debug");
        assert!(matches!(source, ConfigSource::File(p) if p == path));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("STUDYPATH_LISTEN_ADDR", "127.0.0.1:9000"),
            ("STUDYPATH_DATA_PATH", "/tmp/plan.json"),
            ("STUDYPATH_LOG_LEVEL", "debug"),
            ("STUDYPATH_LOG_FORMAT", "TEXT"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/plan.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn invalid_listen_addr_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| (k == "STUDYPATH_LISTEN_ADDR").then(|| "nope".to_string()))
            .unwrap_err();
        assert_eq!(err.stage, "config");
    }
}
