//! The main config loading module for tau.
//!
//! Handles loading and deserializing settings from `tau.toml`.
//!
//! Provides and manages the main [Config] struct, as well as the internal [RawConfig] used for
//! parsing.
//!
//! Also implements default config generation for `tau --init` and `tau --init-full`.

use crate::config::{Editor, General, Keys, Table};
use crate::core::TableOptions;
use crate::utils::get_home;

use serde::Deserialize;
use thiserror::Error;

use std::path::{Path, PathBuf};
use std::{fs, io};

/// Raised when a config file exists but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Raw configuration as read from the toml file
/// This struct is deserialized directly from the toml file and then converted into the main
/// [Config] struct.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawConfig {
    general: General,
    table: Table,
    editor: Editor,
    keys: Keys,
}

/// Main configuration struct for tau
#[derive(Debug, Default)]
pub struct Config {
    general: General,
    table: Table,
    editor: Editor,
    keys: Keys,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: raw.general,
            table: raw.table,
            editor: raw.editor,
            keys: raw.keys,
        }
    }
}

impl Config {
    /// Load configuration from the default path
    /// If the file does not exist or fails to parse, returns the default configuration.
    ///
    /// Called by entry point to load config at startup.
    pub fn load() -> Self {
        let path = Self::default_path();

        if !path.exists() {
            eprintln!(
                "No tau.toml config file found. Using internal defaults. (Tip: run 'tau --init' to generate a config file.)"
            );
            return Self::default();
        }

        match Self::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}, falling back to defaults");
                eprintln!("Error loading config: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Ok(raw.into())
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &General {
        &self.general
    }

    #[inline]
    pub fn table(&self) -> &Table {
        &self.table
    }

    #[inline]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Construction options for the detail table.
    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            columns: self.table.columns(),
            dirs_first: self.general.dirs_first(),
            case_insensitive: self.general.case_insensitive(),
            overscan: self.table.overscan_rows(),
            cell_padding: self.table.cell_padding(),
            size_units: self.table.size_units(),
        }
    }

    /// Determine the default configuration file path.
    /// Checks the TAU_CONFIG environment variable first,
    /// Checks for XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/tau/tau.toml, and to ./tau.toml without a home directory.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("TAU_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("tau/tau.toml");
        }

        if let Some(home) = get_home() {
            return home.join(".config/tau/tau.toml");
        }
        PathBuf::from("tau.toml")
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path, minimal: bool) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {:?}", path),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = if minimal { MINIMAL_TOML } else { FULL_TOML };

        fs::write(path, content)?;
        println!(
            "{} Default config generated at {:?}",
            if minimal { "Minimal" } else { "Full" },
            path
        );
        Ok(())
    }
}

const FULL_TOML: &str = r##"# tau.toml - default configuration for tau

# Note:
# Commented values are the internal defaults of tau

# Listing behavior
[general]
dirs_first = true
show_hidden = true
# case_insensitive = true

[table]
# columns = ["name", "type", "size"]
# overscan_rows = 1
# cell_padding = 2
# size_units = "decimal"     # or "binary"
# recursive_counts = false   # count every item below a directory, not just its children
# metadata_threads = 2
# auto_refresh_secs = 2      # 0 disables
# double_click_ms = 400
# mouse = true
# scroll_padding = 2

# [editor]
# cmd = "nvim"

# [keys]
# go_up = ["k", "Up"]
# go_down = ["j", "Down"]
# extend_up = ["Shift+k", "Shift+Up"]
# extend_down = ["Shift+j", "Shift+Down"]
# toggle_select = ["space"]
# select_all = ["Ctrl+a"]
# clear_selection = ["Ctrl+c"]
# open = ["Enter", "l", "Right"]
# go_parent = ["h", "Left", "Backspace"]
# go_to_top = ["g", "Home"]
# go_to_bottom = ["Shift+g", "End"]
# page_up = ["PageUp", "Ctrl+u"]
# page_down = ["PageDown", "Ctrl+d"]
# sort_name = ["1"]
# sort_type = ["2"]
# sort_size = ["3"]
# reload = ["r", "F5"]
# quit = ["q", "Esc"]
"##;

const MINIMAL_TOML: &str = r##"# tau.toml - minimal configuration
# Only a few basic options. The rest uses internal defaults.
# For advanced options, see tau --config-help.

[general]
dirs_first = true
show_hidden = true

[table]
columns = ["name", "type", "size"]
"##;
