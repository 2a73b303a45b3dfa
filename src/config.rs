use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the scan root when no `--config` is given
pub const CONFIG_FILE: &str = "rcdiff.toml";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    /// A directory holding this file is a component folder
    #[serde(default = "default_marker")]
    pub marker: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Path fragments (with `/` separators) never scanned
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            extension: default_extension(),
            exclude: default_exclude(),
            jobs: default_jobs(),
        }
    }
}

fn default_marker() -> String {
    "en-US.rc".to_string()
}

fn default_extension() -> String {
    "rc".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["/getuname/".to_string()]
}

fn default_jobs() -> usize {
    1
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ReportConfig {
    /// List folders without missing strings too
    #[serde(default)]
    pub show_clean: bool,
}

/// Load and validate an `rcdiff.toml`
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse `{}`: {}", path.display(), e))?;

    validate(&config)?;
    Ok(config)
}

/// Use `explicit` if given, else `rcdiff.toml` in `root`, else the defaults
pub fn resolve_config(root: &Path, explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = explicit {
        return Ok((load_config(path)?, Some(path.to_path_buf())));
    }

    let candidate = root.join(CONFIG_FILE);
    if candidate.is_file() {
        tracing::debug!(path = %candidate.display(), "using config");
        return Ok((load_config(&candidate)?, Some(candidate)));
    }
    Ok((Config::default(), None))
}

fn validate(config: &Config) -> Result<()> {
    let scan = &config.scan;
    if scan.marker.trim().is_empty() {
        anyhow::bail!("scan.marker must name a file, e.g. \"en-US.rc\"");
    }
    if scan.extension.is_empty() || scan.extension.starts_with('.') {
        anyhow::bail!(
            "scan.extension must be given without a leading dot, got {:?}",
            scan.extension
        );
    }
    if scan.jobs == 0 {
        anyhow::bail!("scan.jobs must be at least 1");
    }
    if let Some(bad) = scan.exclude.iter().find(|e| e.is_empty()) {
        anyhow::bail!("scan.exclude contains an empty pattern {:?}", bad);
    }
    Ok(())
}
