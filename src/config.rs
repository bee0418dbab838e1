//! Layered configuration.
//!
//! Values are merged with figment in increasing precedence:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config FILE`, else `./dupclean.toml`, else
//!    `<platform config dir>/dupclean/config.toml`)
//! 3. `DUPCLEAN_*` environment variables (e.g. `DUPCLEAN_MAX_SCAN_DEPTH=2`)
//! 4. command-line flags, applied by the caller
//!
//! ```toml
//! source_folder = "/home/me/Pictures"
//! backup_folder = "/home/me/dupes"
//! max_scan_depth = -1          # -1 = unlimited
//! excluded_file_types = [".tmp", ".part"]
//! concurrent_scan = true
//! max_concurrent_scans = 0     # 0 = one per CPU
//! dry_run = false
//! hash_algorithm = "md5"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::{HashAlgorithm, MaxDepth, ScanConfig};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPCLEAN_";

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "dupclean.toml";

/// Keys accepted in a config file.
pub const KNOWN_KEYS: &[&str] = &[
    "source_folder",
    "backup_folder",
    "max_scan_depth",
    "excluded_file_types",
    "concurrent_scan",
    "max_concurrent_scans",
    "dry_run",
    "hash_algorithm",
    "follow_symlinks",
];

/// Errors raised while loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// The config file could not be read.
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid TOML.
    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config file contains a key nobody reads.
    #[error("Unknown config key '{key}' in {path}{}", suggestion_hint(.suggestion))]
    UnknownKey {
        key: String,
        path: PathBuf,
        suggestion: Option<String>,
    },

    /// A value has the wrong type or shape.
    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// No folder to scan.
    #[error("No source folder given; pass a PATH or set source_folder")]
    MissingSourceFolder,
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{s}'?)"))
        .unwrap_or_default()
}

/// Closest known key to `key`, if any is similar enough.
#[must_use]
pub fn suggest_key(key: &str) -> Option<&'static str> {
    KNOWN_KEYS
        .iter()
        .map(|known| (*known, strsim::jaro_winkler(key, known)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(known, _)| known)
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder to scan
    pub source_folder: Option<PathBuf>,
    /// Folder duplicates would be relocated to
    pub backup_folder: Option<PathBuf>,
    /// Maximum depth; any negative value means unlimited
    pub max_scan_depth: i64,
    /// Extensions to skip, with or without leading dot
    pub excluded_file_types: Vec<String>,
    /// Use the concurrent strategy
    pub concurrent_scan: bool,
    /// Worker bound; zero or negative means one per CPU
    pub max_concurrent_scans: i64,
    /// Never modify the filesystem
    pub dry_run: bool,
    /// Digest used for fingerprints
    pub hash_algorithm: HashAlgorithm,
    /// Follow symbolic links
    pub follow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_folder: None,
            backup_folder: None,
            max_scan_depth: MaxDepth::UNLIMITED_SENTINEL,
            excluded_file_types: Vec::new(),
            concurrent_scan: true,
            max_concurrent_scans: 0,
            dry_run: false,
            hash_algorithm: HashAlgorithm::default(),
            follow_symlinks: false,
        }
    }
}

impl Config {
    /// Load configuration from defaults, a file and the environment.
    ///
    /// With `path` set, that file must exist. Otherwise the default
    /// locations are tried and a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, not TOML,
    /// contains an unknown key, or holds values of the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.is_file() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref file) = file {
            log::debug!("Loading config from {}", file.display());
            check_keys(file)?;
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let config: Self = figment.extract().map_err(Box::new)?;
        log::trace!("Effective config: {:?}", config);
        Ok(config)
    }

    /// The depth bound as a [`MaxDepth`].
    #[must_use]
    pub fn max_depth(&self) -> MaxDepth {
        MaxDepth::from_config(self.max_scan_depth)
    }

    /// Worker bound, with non-positive values mapped to 0 (one per CPU).
    #[must_use]
    pub fn max_workers(&self) -> usize {
        usize::try_from(self.max_concurrent_scans).unwrap_or(0)
    }

    /// Build the immutable scan configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSourceFolder`] when no source folder is
    /// set. Whether it exists is checked by the scanner.
    pub fn to_scan_config(&self) -> Result<ScanConfig, ConfigError> {
        let root = self
            .source_folder
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingSourceFolder)?;

        Ok(ScanConfig::new(root)
            .with_max_depth(self.max_depth())
            .with_excluded_extensions(&self.excluded_file_types)
            .with_concurrent(self.concurrent_scan)
            .with_max_workers(self.max_workers())
            .with_dry_run(self.dry_run)
            .with_algorithm(self.hash_algorithm)
            .with_follow_symlinks(self.follow_symlinks))
    }
}

/// `./dupclean.toml` if present, else the platform config file if present.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    platform_config_path().filter(|p| p.is_file())
}

/// `<config dir>/dupclean/config.toml`, whether or not it exists.
#[must_use]
pub fn platform_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dupclean").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn check_keys(path: &Path) -> Result<(), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = content.parse().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            let suggestion = suggest_key(key).map(str::to_string);
            log::error!("Unknown config key '{}' in {}", key, path.display());
            return Err(ConfigError::UnknownKey {
                key: key.clone(),
                path: path.to_path_buf(),
                suggestion,
            });
        }
    }
    Ok(())
}
