//! Layered configuration loading with figment.
//!
//! # Sources (lowest priority first)
//!
//! 1. Built-in defaults
//! 2. The main file: `relay.<ext>` or `config.<ext>`, found in the search
//!    paths or given explicitly
//! 3. The profile overlay next to it, e.g. `relay.production.toml`
//! 4. Environment variables `RELAY_*`, `__` separating nested keys:
//!    `RELAY_COMMANDS__PREFIX=?`, `RELAY_LOGGING__LEVEL=debug`
//! 5. Programmatic overrides
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: `.toml` files
//! - `yaml-config`: `.yaml` / `.yml` files
//!
//! With both enabled, TOML is preferred when both exist in one directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/relay.toml")
//!     .set("commands.prefix", "?")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::RelayConfig;

/// Stems tried for the main file, in order.
const BASE_NAMES: [&str; 2] = ["relay", "config"];

// =============================================================================
// Profile
// =============================================================================

/// Deployment profile selecting the `relay.<profile>.<ext>` overlay.
///
/// `dev` and `prod` are accepted as short forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile(String);

impl Profile {
    /// Environment variable read by [`Profile::from_env`].
    pub const ENV_VAR: &'static str = "RELAY_PROFILE";

    pub fn new(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        Self(match name.as_str() {
            "dev" => "development".to_string(),
            "prod" => "production".to_string(),
            _ => name,
        })
    }

    pub fn development() -> Self {
        Self("development".to_string())
    }

    pub fn production() -> Self {
        Self("production".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads `RELAY_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .map(|name| Self::new(&name))
            .unwrap_or_default()
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::development()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// File formats
// =============================================================================

/// Configuration file formats compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    #[allow(unused_mut)]
    fn enabled() -> Vec<Self> {
        let mut formats = Vec::new();
        #[cfg(feature = "toml-config")]
        formats.push(Self::Toml);
        #[cfg(feature = "yaml-config")]
        formats.push(Self::Yaml);
        formats
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::enabled()
            .into_iter()
            .find(|format| format.extensions().contains(&ext))
    }

    #[allow(unused_variables)]
    fn merge(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(Yaml::file(path)),
        }
    }
}

/// Main file candidates in `dir`, most preferred first.
fn candidates(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    BASE_NAMES.iter().flat_map(move |name| {
        FileFormat::enabled()
            .into_iter()
            .flat_map(FileFormat::extensions)
            .map(move |ext| dir.join(format!("{name}.{ext}")))
    })
}

/// `relay.toml` → `relay.<profile>.toml`.
fn profile_overlay(path: &Path, profile: &Profile) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{stem}.{profile}.{ext}")))
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Builder collecting configuration sources.
#[derive(Debug)]
pub struct ConfigLoader {
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Replaces the search when set.
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Profile from `RELAY_PROFILE`, environment enabled, default search
    /// paths.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::new(&profile.into());
        self
    }

    /// Adds a directory to search for the main file.
    ///
    /// Without any, the current directory and then the user configuration
    /// directory (`~/.config/relay` on Linux) are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join("relay")),
            None => self,
        }
    }

    /// Loads this file instead of searching. A missing file is an error.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a whole configuration over every other source.
    pub fn merge(mut self, config: RelayConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Overrides a single value by dotted key, e.g. `commands.prefix`.
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Merges every source and extracts the configuration.
    pub fn load(self) -> ConfigResult<RelayConfig> {
        let profile = self.profile.clone();
        let config: RelayConfig = self.into_figment()?.extract()?;

        debug!(
            profile = %profile,
            prefix = %config.commands.prefix,
            level = %config.logging.level,
            "Configuration loaded"
        );

        Ok(config)
    }

    fn into_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(RelayConfig::default()));

        match self.main_file()? {
            Some(path) => figment = self.merge_file(figment, &path)?,
            None => warn!(
                paths = ?self.search_dirs(),
                "No configuration file found, using defaults"
            ),
        }

        if self.load_env {
            trace!("Reading RELAY_ environment variables");
            figment = figment.merge(Env::prefixed("RELAY_").ignore(&["PROFILE"]).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    fn main_file(&self) -> ConfigResult<Option<PathBuf>> {
        match &self.config_file {
            Some(path) if path.is_file() => Ok(Some(path.clone())),
            Some(path) => Err(ConfigError::FileNotFound(path.clone())),
            None => Ok(self
                .search_dirs()
                .iter()
                .find_map(|dir| candidates(dir).find(|path| path.is_file()))),
        }
    }

    /// Merges `path` and, if present, its profile overlay.
    fn merge_file(&self, figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let format = FileFormat::from_path(path).ok_or_else(|| {
            ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: {}",
                path.display()
            ))
        })?;

        info!(path = %path.display(), "Loading configuration file");
        let mut figment = format.merge(figment, path);

        if let Some(overlay) = profile_overlay(path, &self.profile)
            && overlay.is_file()
        {
            debug!(path = %overlay.display(), profile = %self.profile, "Loading profile overlay");
            figment = format.merge(figment, &overlay);
        }

        Ok(figment)
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("relay")))
            .collect()
    }
}

/// Loads configuration from the default locations and the environment.
pub fn load_config() -> ConfigResult<RelayConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path` and the environment.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<RelayConfig> {
    ConfigLoader::new().file(path).load()
}
