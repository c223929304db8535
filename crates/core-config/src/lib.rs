//! Configuration loading and parsing.
//!
//! Reads `oxedit.toml` (or an override path provided by the embedder):
//!
//! ```toml
//! [indent]
//! tab_width = 4
//! use_tabs = false
//! [repeat]
//! max_depth = 8
//! [registers]
//! read_only = ".:%"
//! ```
//!
//! Every field is optional. Unknown fields are ignored so the file can grow
//! without warnings; a file that fails to parse falls back to defaults. The
//! raw parsed values are kept beside the clamped effective ones so callers
//! can report what the user actually wrote.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Tab geometry used by the indent transformer.
pub trait TabPolicy {
    /// Columns per indent step and per tab stop.
    fn tab_width(&self) -> usize;
    /// Whether indentation is rebuilt with tabs (remainder in spaces).
    fn use_tabs(&self) -> bool;
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndentConfig {
    #[serde(default = "IndentConfig::default_tab_width")]
    pub tab_width: i64,
    #[serde(default)]
    pub use_tabs: bool,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            tab_width: Self::default_tab_width(),
            use_tabs: false,
        }
    }
}

impl IndentConfig {
    const fn default_tab_width() -> i64 {
        4
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepeatConfig {
    /// Cap on nested stroke replays (a replayed stroke that itself replays).
    #[serde(default = "RepeatConfig::default_max_depth")]
    pub max_depth: i64,
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
        }
    }
}

impl RepeatConfig {
    const fn default_max_depth() -> i64 {
        8
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistersConfig {
    #[serde(default = "RegistersConfig::default_read_only")]
    pub read_only: String,
}

impl Default for RegistersConfig {
    fn default() -> Self {
        Self {
            read_only: Self::default_read_only(),
        }
    }
}

impl RegistersConfig {
    fn default_read_only() -> String {
        ".:%".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub indent: IndentConfig,
    #[serde(default)]
    pub repeat: RepeatConfig,
    #[serde(default)]
    pub registers: RegistersConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub effective_tab_width: usize,
    pub effective_max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(None, ConfigFile::default())
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    // Prefer the working directory before the platform config dir.
    let local = PathBuf::from("oxedit.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxedit").join("oxedit.toml");
    }
    PathBuf::from("oxedit.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    Ok(parse(content, &path))
}

fn parse(content: String, path: &std::path::Path) -> Config {
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Config::from_file(Some(content), file),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Config::default()
        }
    }
}

impl Config {
    fn from_file(raw: Option<String>, file: ConfigFile) -> Self {
        let mut cfg = Self {
            raw,
            file,
            effective_tab_width: 4,
            effective_max_depth: 8,
        };
        cfg.resolve();
        cfg
    }

    /// Config with the given indent settings and every other value default.
    pub fn with_indent(tab_width: usize, use_tabs: bool) -> Self {
        let mut file = ConfigFile::default();
        file.indent.tab_width = i64::try_from(tab_width).unwrap_or(i64::MAX);
        file.indent.use_tabs = use_tabs;
        Self::from_file(None, file)
    }

    /// Recompute the effective values from `file`, clamping out-of-range
    /// settings. Returns true when anything had to be clamped.
    pub fn resolve(&mut self) -> bool {
        let raw_tab = self.file.indent.tab_width;
        let tab = raw_tab.clamp(1, 64);
        let raw_depth = self.file.repeat.max_depth;
        let depth = raw_depth.clamp(1, 64);
        let clamped = tab != raw_tab || depth != raw_depth;
        if clamped {
            info!(
                target: "config",
                raw_tab_width = raw_tab,
                tab_width = tab,
                raw_max_depth = raw_depth,
                max_depth = depth,
                "config_values_clamped"
            );
        }
        // Both values are within 1..=64 here.
        self.effective_tab_width = tab as usize;
        self.effective_max_depth = depth as u32;
        clamped
    }

    /// Registers that refuse captures.
    pub fn read_only_registers(&self) -> Vec<char> {
        self.file
            .registers
            .read_only
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

impl TabPolicy for Config {
    fn tab_width(&self) -> usize {
        self.effective_tab_width
    }

    fn use_tabs(&self) -> bool {
        self.file.indent.use_tabs
    }
}
