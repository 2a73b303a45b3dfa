use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;

use crate::commands::{folder_path, install_cancel_handler, print_folder, print_json};
use crate::config;
use crate::model::report;
use crate::scan::{self, CancelFlag};

pub struct ScanOptions<'a> {
    pub root: &'a str,
    /// Also list folders with nothing missing
    pub all: bool,
    pub json: bool,
    pub config: Option<&'a str>,
    pub jobs: Option<usize>,
}

/// Scan a tree of component folders and report missing translations.
///
/// Succeeds even when strings are missing; use `check` to gate on that.
pub fn execute(options: &ScanOptions) -> Result<()> {
    let start = Instant::now();
    let root = folder_path(options.root)?;
    let (mut config, config_path) = config::resolve_config(&root, options.config.map(Path::new))?;
    if let Some(jobs) = options.jobs {
        if jobs == 0 {
            anyhow::bail!("--jobs must be at least 1");
        }
        config.scan.jobs = jobs;
    }
    if let Some(path) = &config_path {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let cancel = CancelFlag::new();
    install_cancel_handler(&cancel)?;

    let pb = if options.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.dim} [{bar:30}] {pos}/{len} {msg}")?
                .progress_chars("=> "),
        );
        pb
    };

    let results = scan::scan(&root, &config.scan, &cancel, |progress| {
        pb.set_length(progress.total as u64);
        pb.set_position(progress.done as u64);
        let name = progress
            .folder
            .strip_prefix(&root)
            .unwrap_or(progress.folder)
            .display()
            .to_string();
        pb.set_message(name);
    });
    pb.finish_and_clear();

    let show_clean = options.all || config.report.show_clean;

    if options.json {
        let summaries: Vec<_> = results
            .folders
            .iter()
            .filter(|f| show_clean || f.has_errors() || !f.failures.is_empty())
            .map(report::folder_summary)
            .collect();
        print_json(&summaries)?;
    } else {
        for folder in &results.folders {
            if show_clean || folder.has_errors() || !folder.failures.is_empty() {
                print_folder(folder);
            }
        }
        for skipped in &results.skipped {
            let path = skipped
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            eprintln!("{} skipped {}: {}", "warning:".yellow().bold(), path, skipped.reason);
        }

        let with_errors = results.folders.iter().filter(|f| f.has_errors()).count();
        println!(
            "   {} {} folder(s), {} with missing strings, in {:.2}s",
            "Scanned".green().bold(),
            results.folders.len(),
            with_errors,
            start.elapsed().as_secs_f64()
        );
    }

    if results.cancelled {
        anyhow::bail!("scan cancelled");
    }
    Ok(())
}
