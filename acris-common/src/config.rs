//! Configuration loading and root folder resolution
//!
//! Root folder resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`ACRIS_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops startup: a warning is logged
//! and compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "ACRIS_ROOT_FOLDER";

/// Environment variable pointing at an explicit TOML config file
pub const CONFIG_FILE_ENV: &str = "ACRIS_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "acris.db";

/// Parsed TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub thumbnail: ThumbnailConfig,

    #[serde(default)]
    pub ingest: IngestConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[thumbnail]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Longest edge of a stored thumbnail, in pixels
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_max_dimension() -> u32 {
    512
}

fn default_jpeg_quality() -> u8 {
    85
}

/// `[ingest]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Largest file the ingest binary will read from disk
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> u64 {
    512 * 1024 * 1024
}

impl TomlConfig {
    /// Reject values that would make thumbnail encoding or uploads impossible
    pub fn validate(&self) -> Result<()> {
        if self.thumbnail.max_dimension == 0 {
            return Err(Error::Config(
                "thumbnail.max_dimension must be greater than 0".to_string(),
            ));
        }
        if !(1..=100).contains(&self.thumbnail.jpeg_quality) {
            return Err(Error::Config(format!(
                "thumbnail.jpeg_quality must be within 1..=100, got {}",
                self.thumbnail.jpeg_quality
            )));
        }
        if self.ingest.max_upload_bytes == 0 {
            return Err(Error::Config(
                "ingest.max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform defaults compiled into the binary
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            // ~/.local/share/acris (or /var/lib/acris for system-wide)
            dirs::data_local_dir()
                .map(|d| d.join("acris"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/acris"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("acris"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/acris"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("acris"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\acris"))
        } else {
            PathBuf::from("./acris_data")
        };

        Self {
            root_folder,
            log_level: default_log_level(),
        }
    }
}

/// Candidate config file locations for a module, most specific first
pub fn default_config_paths(module_name: &str) -> Vec<PathBuf> {
    let file_name = format!("{}.toml", module_name);
    let mut paths = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("acris").join(&file_name));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/acris").join(&file_name));
    }

    paths
}

/// Read and parse one TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration with graceful degradation
///
/// An explicit path (CLI or `ACRIS_CONFIG`) is tried first, then the default
/// locations. Any failure logs a warning and yields defaults.
pub fn load_config(explicit: Option<&Path>, module_name: &str) -> TomlConfig {
    let env_path = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);
    let explicit = explicit.map(Path::to_path_buf).or(env_path);

    if let Some(path) = explicit {
        return match load_toml_config(&path) {
            Ok(config) => {
                info!("Loaded config: {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} - using compiled defaults", e);
                TomlConfig::default()
            }
        };
    }

    for path in default_config_paths(module_name) {
        if !path.exists() {
            debug!("No config at {}", path.display());
            continue;
        }
        match load_toml_config(&path) {
            Ok(config) => {
                info!("Loaded config: {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("{} - using compiled defaults", e);
                return TomlConfig::default();
            }
        }
    }

    warn!("No config file found for {} - using compiled defaults", module_name);
    TomlConfig::default()
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            toml_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!(module = %self.module_name, "Root folder from command line");
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                debug!(module = %self.module_name, "Root folder from {}", ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            debug!(module = %self.module_name, "Root folder from TOML config");
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the resolved root folder for use
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}
