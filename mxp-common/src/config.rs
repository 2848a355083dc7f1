//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a small TOML file. Everything has a
//! compiled default, so a missing file is never fatal: the service logs a
//! warning and starts with defaults.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MXP_ROOT_FOLDER`, then `MXP_ROOT`)
//! 3. TOML config file (`root_folder`)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Primary environment variable for the root folder
pub const ROOT_FOLDER_ENV: &str = "MXP_ROOT_FOLDER";

/// Legacy/short environment variable for the root folder
pub const ROOT_ENV: &str = "MXP_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "mxp.db";

/// Export artifact directory name inside the root folder
pub const EXPORT_DIR_NAME: &str = "exports";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Root folder holding the database and export directory
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Media library snapshot consumed by the export service
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Export job tuning
    #[serde(default)]
    pub export: ExportConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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

/// Export job tuning parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    /// Extraction workers per job
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Jobs allowed to run at the same time
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Running plus waiting jobs accepted before submissions are rejected
    #[serde(default = "default_max_queued_jobs")]
    pub max_queued_jobs: usize,

    /// Rows per page for job listings
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            max_queued_jobs: default_max_queued_jobs(),
            page_size: default_page_size(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_worker_count() -> usize {
    4
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_max_queued_jobs() -> usize {
    16
}

fn default_page_size() -> i64 {
    100
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub port: u16,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
            port: 5780,
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/mxp (or /var/lib/mxp for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("mxp"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/mxp"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/mxp
        dirs::data_dir()
            .map(|d| d.join("mxp"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/mxp"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\mxp
        dirs::data_local_dir()
            .map(|d| d.join("mxp"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\mxp"))
    } else {
        PathBuf::from("./mxp_data")
    }
}

/// Default TOML config location for a module (`~/.config/mxp/<module>.toml`)
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mxp").join(format!("{}.toml", module_name)))
}

/// Load TOML config, falling back to defaults when the file is missing
///
/// A file that exists but fails to parse is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write TOML config, creating the parent directory if needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    // Write to a sibling temp file then rename so readers never see a partial file
    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Root folder resolver following the priority order in the module docs
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    /// Command-line override (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// TOML `root_folder` (priority 3)
    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    /// Resolve the root folder. Never fails; falls back to the compiled default.
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!(module = %self.module_name, "Root folder from command line: {}", path.display());
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    info!(module = %self.module_name, "Root folder from {}: {}", var, path);
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(path) = &self.toml_root {
            info!(module = %self.module_name, "Root folder from TOML config: {}", path.display());
            return path.clone();
        }

        let path = CompiledDefaults::for_current_platform().root_folder;
        info!(module = %self.module_name, "Root folder from compiled default: {}", path.display());
        path
    }
}

/// Creates the root folder layout on first run
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create root folder and export directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.export_dir())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// SQLite database path
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// Directory holding export artifacts
    pub fn export_dir(&self) -> PathBuf {
        self.root_folder.join(EXPORT_DIR_NAME)
    }
}
