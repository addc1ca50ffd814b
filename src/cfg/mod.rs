use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::overrides::OverrideSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub overrides: OverrideSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory probes are resolved under; `/` on a live system
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default = "default_summary_style")]
    pub summary_style: SummaryStyle,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    Full,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            root: default_root(),
            summary_style: default_summary_style(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_summary_style() -> SummaryStyle {
    SummaryStyle::Full
}

fn default_interval_secs() -> u64 {
    300
}

/// `~/.hwfacts/config.toml`
pub fn default_path() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Failed to find home directory")?
        .join(".hwfacts")
        .join("config.toml"))
}

pub fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    save(config_path, &Config::default())
}

pub fn load(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        anyhow::bail!(
            "Config not found at {}. Run 'hwfacts init' first.",
            config_path.display()
        );
    }

    let contents = fs::read_to_string(config_path).context("Failed to read config file")?;
    parse(&contents).with_context(|| format!("Invalid config at {}", config_path.display()))
}

/// Like [`load`], but a missing file yields the defaults. Detection does
/// not need a config; a present but invalid one is still an error.
pub fn load_or_default(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        load(config_path)
    } else {
        Ok(Config::default())
    }
}

pub fn parse(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).context("Failed to parse config file")?;
    config.overrides.validate()?;

    if config.watch.interval_secs == 0 {
        anyhow::bail!("watch.interval_secs must be greater than zero");
    }

    Ok(config)
}

pub fn save(config_path: &Path, config: &Config) -> Result<()> {
    let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(config_path, toml_string).context("Failed to write config file")?;
    Ok(())
}

pub fn check_exists(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        Ok(())
    } else {
        anyhow::bail!("Config file not found")
    }
}
