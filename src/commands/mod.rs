pub mod check;
pub mod parse;
pub mod scan;
pub mod show;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::model::{report, ComponentFolder};
use crate::scan::CancelFlag;

/// Resolve a folder argument to an existing directory
pub fn folder_path(target: &str) -> Result<PathBuf> {
    let path = Path::new(target);
    if !path.is_dir() {
        anyhow::bail!("not a directory: {}", target);
    }
    Ok(path.to_path_buf())
}

/// Load and compare a single component folder, reading `rcdiff.toml` from it
pub fn load_folder(target: &str) -> Result<(ComponentFolder, Config)> {
    let dir = folder_path(target)?;
    let (config, _) = config::resolve_config(&dir, None)?;

    let mut folder = ComponentFolder::new(&dir, &dir);
    folder
        .load(&config.scan.extension)
        .with_context(|| format!("failed to list {}", dir.display()))?;

    if folder.files.is_empty() {
        println!(
            "{} no .{} files in {}",
            "warning:".yellow().bold(),
            config.scan.extension,
            dir.display()
        );
    }
    Ok((folder, config))
}

/// Trip `flag` on Ctrl+C
pub fn install_cancel_handler(flag: &CancelFlag) -> Result<()> {
    let flag = flag.clone();
    ctrlc::set_handler(move || flag.cancel()).context("failed to install Ctrl+C handler")
}

/// Human-readable report for one folder
pub fn print_folder(folder: &ComponentFolder) {
    let title = if folder.has_errors() {
        folder.name().red().bold()
    } else {
        folder.name().green().bold()
    };
    println!("{}", title);

    for failure in &folder.failures {
        let name = failure
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {} {}: {}", "warning:".yellow().bold(), name, failure.error);
    }

    for file in folder.file_ids() {
        let lines = report::file_details(folder, file);
        if lines.is_empty() {
            continue;
        }
        println!("  {}", folder.file(file).name().yellow());
        for line in lines {
            println!("    {}", line);
        }
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{}", text);
    Ok(())
}
