//! Startup configuration: backend selection, logging and uploads.
//!
//! # Responsibility
//! - Load an optional `.env` file, an optional TOML file and `FOLIO_*`
//!   environment overrides, in that order of increasing precedence.
//! - Produce one immutable [`FolioConfig`] consumed at application startup.
//!
//! # Invariants
//! - Backend kind is decided here once; nothing downstream re-reads the
//!   environment.
//! - An explicitly requested config file that does not exist is an error;
//!   a missing default file is not.

use crate::logging::default_log_level;
use crate::store::DEFAULT_MAX_COLLECTION_BYTES;
use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "folio.toml";
const DEFAULT_DB_PATH: &str = "folio.sqlite3";
const DEFAULT_STORE_DIR: &str = "folio-data";
const DEFAULT_UPLOAD_PREFIX: &str = "/uploads";

const ENV_CONFIG_PATH: &str = "FOLIO_CONFIG";
const ENV_BACKEND: &str = "FOLIO_BACKEND";
const ENV_DB_PATH: &str = "FOLIO_DB_PATH";
const ENV_STORE_DIR: &str = "FOLIO_STORE_DIR";
const ENV_STORE_MAX_BYTES: &str = "FOLIO_STORE_MAX_BYTES";
const ENV_LOG_LEVEL: &str = "FOLIO_LOG_LEVEL";
const ENV_LOG_DIR: &str = "FOLIO_LOG_DIR";
const ENV_UPLOAD_DIR: &str = "FOLIO_UPLOAD_DIR";
const ENV_UPLOAD_PREFIX: &str = "FOLIO_UPLOAD_PREFIX";
const ENV_UPLOAD_MAX_BYTES: &str = "FOLIO_UPLOAD_MAX_BYTES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file `{path}` does not exist")]
    MissingConfig { path: PathBuf },
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
    #[error("unknown backend `{0}`; expected sqlite|json_file")]
    UnknownBackend(String),
    #[error("invalid value `{value}` for {key}: expected a byte count")]
    InvalidByteCount { key: &'static str, value: String },
}

/// Which persistence backend to open at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Relational store in a SQLite file.
    Sqlite { path: PathBuf },
    /// JSON documents in a directory, with a per-collection byte capacity.
    JsonFile { dir: PathBuf, max_bytes: u64 },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Rolling log directory; `None` logs to stderr.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Where uploaded images end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Directory for stored files; `None` embeds uploads as data URIs.
    pub dir: Option<PathBuf>,
    /// Public URL prefix for files stored under `dir`.
    pub public_prefix: String,
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: None,
            public_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolioConfig {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    pub uploads: UploadConfig,
}

/// Shape of `folio.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub backend: FileBackendConfig,
    pub logging: FileLoggingConfig,
    pub uploads: FileUploadConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileBackendConfig {
    pub kind: Option<String>,
    pub path: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub max_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLoggingConfig {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileUploadConfig {
    pub dir: Option<PathBuf>,
    pub public_prefix: Option<String>,
    pub max_bytes: Option<u64>,
}

/// `FOLIO_*` values captured from the environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    values: HashMap<String, String>,
}

impl EnvOverrides {
    /// Captures every `FOLIO_*` variable of the current process.
    pub fn gather() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Builds overrides from explicit pairs; non-`FOLIO_*` keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(key, value)| key.starts_with("FOLIO_") && !value.trim().is_empty())
            .collect();
        Self { values }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|value| value.trim())
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    fn bytes(&self, key: &'static str) -> Result<Option<u64>, ConfigError> {
        self.get(key)
            .map(|value| {
                value.parse::<u64>().map_err(|_| ConfigError::InvalidByteCount {
                    key,
                    value: value.to_string(),
                })
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Resolves [`FolioConfig`] from env file, TOML file and environment.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Loads the configuration for this process.
    pub fn load(&self) -> Result<FolioConfig, ConfigError> {
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        match loaded {
            Ok(()) => {}
            Err(dotenvy::Error::Io(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let env = EnvOverrides::gather();
        let file = self.load_file_config(&env)?;
        resolve(file.unwrap_or_default(), &env)
    }

    fn load_file_config(&self, env: &EnvOverrides) -> Result<Option<FileConfig>, ConfigError> {
        let (path, explicit) = match (&self.options.config_path, env.path(ENV_CONFIG_PATH)) {
            (Some(path), _) => (path.clone(), true),
            (None, Some(path)) => (path, true),
            (None, None) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::MissingConfig { path });
            }
            return Ok(None);
        }
        parse_config_file(&path).map(Some)
    }
}

/// Parses one TOML config file.
pub fn parse_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merges file values and environment overrides onto defaults.
pub fn resolve(file: FileConfig, env: &EnvOverrides) -> Result<FolioConfig, ConfigError> {
    let kind = env
        .get(ENV_BACKEND)
        .map(str::to_string)
        .or(file.backend.kind)
        .unwrap_or_else(|| "sqlite".to_string());

    let backend = match kind.trim().to_ascii_lowercase().as_str() {
        "sqlite" => BackendConfig::Sqlite {
            path: env
                .path(ENV_DB_PATH)
                .or(file.backend.path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
        },
        "json_file" | "json" | "local" => BackendConfig::JsonFile {
            dir: env
                .path(ENV_STORE_DIR)
                .or(file.backend.dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
            max_bytes: env
                .bytes(ENV_STORE_MAX_BYTES)?
                .or(file.backend.max_bytes)
                .unwrap_or(DEFAULT_MAX_COLLECTION_BYTES),
        },
        _ => return Err(ConfigError::UnknownBackend(kind)),
    };

    let logging = LoggingConfig {
        level: env
            .get(ENV_LOG_LEVEL)
            .map(str::to_string)
            .or(file.logging.level)
            .unwrap_or_else(|| default_log_level().to_string()),
        dir: env.path(ENV_LOG_DIR).or(file.logging.dir),
    };

    let uploads = UploadConfig {
        dir: env.path(ENV_UPLOAD_DIR).or(file.uploads.dir),
        public_prefix: env
            .get(ENV_UPLOAD_PREFIX)
            .map(str::to_string)
            .or(file.uploads.public_prefix)
            .unwrap_or_else(|| DEFAULT_UPLOAD_PREFIX.to_string()),
        max_bytes: env
            .bytes(ENV_UPLOAD_MAX_BYTES)?
            .or(file.uploads.max_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
    };

    Ok(FolioConfig {
        backend,
        logging,
        uploads,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        parse_config_file, resolve, BackendConfig, ConfigError, ConfigLoader, EnvOverrides,
        FileConfig, FolioConfig,
    };
    use std::path::PathBuf;

    fn no_env() -> EnvOverrides {
        EnvOverrides::from_pairs(Vec::<(String, String)>::new())
    }

    #[test]
    fn empty_sources_resolve_to_defaults() {
        let config = resolve(FileConfig::default(), &no_env()).unwrap();
        assert_eq!(config, FolioConfig::default());
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from("folio.sqlite3")
            }
        );
    }

    #[test]
    fn file_selects_json_backend() {
        let file: FileConfig = toml::from_str(
            r#"
            [backend]
            kind = "json_file"
            dir = "/srv/folio"
            max_bytes = 1024
            "#,
        )
        .unwrap();
        let config = resolve(file, &no_env()).unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::JsonFile {
                dir: PathBuf::from("/srv/folio"),
                max_bytes: 1024
            }
        );
    }

    #[test]
    fn env_overrides_win_over_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [backend]
            kind = "json_file"
            [logging]
            level = "warn"
            [uploads]
            public_prefix = "/media"
            "#,
        )
        .unwrap();
        let env = EnvOverrides::from_pairs([
            ("FOLIO_BACKEND", "sqlite"),
            ("FOLIO_DB_PATH", "/tmp/site.db"),
            ("FOLIO_LOG_LEVEL", "debug"),
            ("FOLIO_UPLOAD_MAX_BYTES", "2048"),
            ("HOME", "/root"),
        ]);
        let config = resolve(file, &env).unwrap();

        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from("/tmp/site.db")
            }
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.uploads.public_prefix, "/media");
        assert_eq!(config.uploads.max_bytes, 2048);
    }

    #[test]
    fn unknown_backend_and_bad_byte_counts_are_rejected() {
        let env = EnvOverrides::from_pairs([("FOLIO_BACKEND", "postgres")]);
        assert!(matches!(
            resolve(FileConfig::default(), &env),
            Err(ConfigError::UnknownBackend(kind)) if kind == "postgres"
        ));

        let env = EnvOverrides::from_pairs([
            ("FOLIO_BACKEND", "json_file"),
            ("FOLIO_STORE_MAX_BYTES", "lots"),
        ]);
        assert!(matches!(
            resolve(FileConfig::default(), &env),
            Err(ConfigError::InvalidByteCount { key: "FOLIO_STORE_MAX_BYTES", .. })
        ));
    }

    #[test]
    fn unknown_file_keys_fail_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "[backend]\nflavor = \"sqlite\"\n").unwrap();
        assert!(matches!(
            parse_config_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = ConfigLoader::new()
            .with_config_path(&missing)
            .with_env_file(dir.path().join("absent.env"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfig { path } if path == missing));
    }
}
