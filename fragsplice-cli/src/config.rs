//! Configuration file loading for fragsplice.
//!
//! Discovers and loads `fragsplice.toml` from the current directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fragsplice_core::Dialect;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "fragsplice.toml";

/// Top-level configuration from fragsplice.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FragspliceConfig {
    /// Fragment rendering.
    pub fragment: FragmentConfig,

    /// Post-splice formatting.
    pub format: FormatConfig,

    /// Ledger placement.
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    /// Declaration syntax for encoded fragments.
    pub dialect: Dialect,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Run a formatter over the host after each splice.
    pub enabled: bool,

    /// Formatter command line; the host path is appended.
    /// When unset the default for the dialect is used.
    pub command: Option<Vec<String>>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory for ledger and fragment files (default: next to the host).
    pub work_dir: Option<Utf8PathBuf>,
}

/// Formatter used when the config names none.
pub fn default_format_command(dialect: Dialect) -> Vec<String> {
    match dialect {
        Dialect::Rust => vec!["rustfmt".into(), "--edition".into(), "2021".into()],
        Dialect::C => vec!["clang-format".into(), "-i".into()],
    }
}

/// Discover the fragsplice.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a fragsplice.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<FragspliceConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<FragspliceConfig> {
    let config: FragspliceConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `dir`, or return default if not found.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<FragspliceConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(FragspliceConfig::default()),
    }
}

/// Config file and CLI arguments combined.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub dialect: Dialect,
    pub work_dir: Option<Utf8PathBuf>,
    /// `None` when formatting is disabled.
    pub format_command: Option<Vec<String>>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: FragspliceConfig,
}

impl ConfigMerger {
    pub fn new(config: FragspliceConfig) -> Self {
        Self { config }
    }

    /// CLI values replace config values when given; `--no-format` always wins.
    pub fn merge(
        self,
        cli_dialect: Option<Dialect>,
        cli_work_dir: Option<Utf8PathBuf>,
        no_format: bool,
    ) -> MergedConfig {
        let dialect = cli_dialect.unwrap_or(self.config.fragment.dialect);
        let work_dir = cli_work_dir.or(self.config.ledger.work_dir);

        let format_command = if no_format || !self.config.format.enabled {
            None
        } else {
            Some(
                self.config
                    .format
                    .command
                    .unwrap_or_else(|| default_format_command(dialect)),
            )
        };

        MergedConfig {
            dialect,
            work_dir,
            format_command,
        }
    }
}
