//! TOML-based host configuration for varstored.
//!
//! Reads `varstored.toml` from the platform-appropriate config directory:
//! - Windows:  `%APPDATA%\varstored\varstored.toml`
//! - Linux:    `~/.config/varstored/varstored.toml`
//! - macOS:    `~/Library/Application Support/varstored/varstored.toml`
//!
//! An explicit path (first CLI argument) overrides the platform location.
//! Every field has a default, so a missing file means "first run", not an
//! error. Example:
//!
//! ```toml
//! [host]
//! log_level = "info"
//!
//! [store]
//! filename = "~/printer_vars.cfg"
//!
//! [[macro]]
//! name = "heat_bed"
//! alias = "heat_bed"
//! [macro.variables]
//! speed = "0"
//! ```
//!
//! Macro declarations carry their initial variables as literal text (the
//! same syntax the variables file uses), decoded at startup; a declaration
//! that does not parse is a configuration failure, caught before the host
//! accepts any command.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use varstore_core::{parse_literal, LiteralError, VariableMap};

use crate::infrastructure::macros::{ConfigMacro, MacroRegistry};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A macro declaration's initial variable is not a parsable literal.
    #[error("macro {macro_name:?}, variable {variable:?}: {source}")]
    MacroVariable {
        macro_name: String,
        variable: String,
        #[source]
        source: LiteralError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level host configuration stored on disk.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct HostConfig {
    #[serde(default)]
    pub host: HostSection,
    #[serde(default)]
    pub store: StoreSection,
    /// Declared macro units, in declaration order.
    #[serde(default, rename = "macro")]
    pub macros: Vec<MacroEntry>,
}

/// General host behaviour settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HostSection {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the variables file lives.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StoreSection {
    /// Path of the backing variables file. A leading `~` expands to the
    /// user's home directory.
    #[serde(default = "default_filename")]
    pub filename: String,
}

/// One declared macro unit: registration name, optional alias, and the
/// initial live variables as literal text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MacroEntry {
    /// Registration name; doubles as the store section for targeted saves.
    pub name: String,
    /// Human-chosen alias used to target saves at this macro.
    #[serde(default)]
    pub alias: Option<String>,
    /// Initial variable bindings, each value in literal syntax.
    #[serde(default)]
    pub variables: std::collections::BTreeMap<String, String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_filename() -> String {
    "~/printer_vars.cfg".to_string()
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            filename: default_filename(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config
/// base directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full default path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory
/// cannot be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("varstored.toml"))
}

/// Loads [`HostConfig`] from the default platform location, returning
/// `HostConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<HostConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads [`HostConfig`] from an explicit path. A missing file yields the
/// defaults, same as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<HostConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: HostConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HostConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Builds the macro registry from the configuration's macro declarations,
/// decoding each initial variable's literal text.
///
/// # Errors
///
/// Returns [`ConfigError::MacroVariable`] for the first declaration whose
/// value text is not a literal.
pub fn build_registry(config: &HostConfig) -> Result<MacroRegistry, ConfigError> {
    let mut registry = MacroRegistry::new();
    for entry in &config.macros {
        let mut variables = VariableMap::new();
        for (name, text) in &entry.variables {
            let value = parse_literal(text).map_err(|source| ConfigError::MacroVariable {
                macro_name: entry.name.clone(),
                variable: name.clone(),
                source,
            })?;
            variables.insert(name.clone(), value);
        }
        registry.register(
            entry.name.clone(),
            Box::new(ConfigMacro::new(entry.alias.clone(), variables)),
        );
    }
    Ok(registry)
}

/// Expands a leading `~` in `path` to the user's home directory. Paths
/// without a leading `~` pass through unchanged, as does the whole path
/// when no home directory can be determined.
pub fn expand_user(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("USERPROFILE").map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("HOME").map(PathBuf::from)
    }
}

/// Resolves the platform config base directory including the `varstored`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("varstored"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("varstored"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/varstored
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("varstored")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        // Fallback for unsupported platforms.
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
