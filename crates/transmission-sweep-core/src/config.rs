use config::{Config, Environment, File as ConfigFile, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Resolved configuration, evaluated once at startup before the pipeline
/// runs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub torrents_dir: Option<String>,
    pub incomplete_dir: Option<String>,
}

/// Values given explicitly on the command line; they win over every other
/// source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub torrents_dir: Option<String>,
    pub incomplete_dir: Option<String>,
}

pub fn load_configuration(overrides: &ConfigOverrides) -> Result<AppConfig, Error> {
    build_configuration(default_config_file().as_deref(), overrides)
}

/// Source precedence, lowest to highest: built-in defaults, JSON config
/// file, TRANSMISSION_* environment variables, explicit flags.
fn build_configuration(
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<AppConfig, Error> {
    let mut builder = Config::builder()
        .set_default("host", "localhost")?
        .set_default("port", 9091_i64)?;

    if let Some(path) = config_file {
        builder = builder.add_source(
            ConfigFile::from(path)
                .format(FileFormat::Json)
                .required(false),
        );
    }

    let builder = builder
        .add_source(Environment::with_prefix("TRANSMISSION"))
        .set_override_option("host", overrides.host.clone())?
        .set_override_option("port", overrides.port.map(i64::from))?
        .set_override_option("torrents_dir", overrides.torrents_dir.clone())?
        .set_override_option("incomplete_dir", overrides.incomplete_dir.clone())?;

    let config = builder.build()?.try_deserialize::<AppConfig>()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), Error> {
    if config.host.is_empty() {
        return Err(Error::InvalidConfig("host must not be empty".to_string()));
    }
    if config.port == 0 {
        return Err(Error::InvalidConfig(
            "port must be in the range 1-65535".to_string(),
        ));
    }
    Ok(())
}

fn default_config_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("transmission-sweep")
            .join("config.json")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_file_or_overrides() {
        let config = build_configuration(None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9091);
        assert!(config.torrents_dir.is_none());
        assert!(config.incomplete_dir.is_none());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"host": "nas.local", "port": 9191, "incomplete_dir": "/downloads/incomplete"}"#,
        )
        .unwrap();

        let config = build_configuration(Some(&path), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.host, "nas.local");
        assert_eq!(config.port, 9191);
        assert_eq!(
            config.incomplete_dir.as_deref(),
            Some("/downloads/incomplete")
        );
    }

    #[test]
    fn test_explicit_flags_win_over_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"host": "nas.local", "port": 9191}"#).unwrap();

        let overrides = ConfigOverrides {
            host: Some("other.local".to_string()),
            port: Some(8080),
            ..ConfigOverrides::default()
        };
        let config = build_configuration(Some(&path), &overrides).unwrap();
        assert_eq!(config.host, "other.local");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_missing_config_file_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("does-not-exist.json");
        let config = build_configuration(Some(&path), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.port, 9091);
    }

    #[test]
    fn test_port_zero_is_rejected() {
        let overrides = ConfigOverrides {
            port: Some(0),
            ..ConfigOverrides::default()
        };
        let err = build_configuration(None, &overrides).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
