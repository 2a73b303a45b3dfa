use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::commands::{load_folder, print_folder, print_json};
use crate::model::report;

/// Compare the language files of one folder; fail if anything is missing
pub fn execute(target: &str, json: bool) -> Result<()> {
    let start = Instant::now();
    let (folder, _config) = load_folder(target)?;

    if json {
        print_json(&report::folder_summary(&folder))?;
    } else {
        print_folder(&folder);
    }

    let stats = folder.stats();
    if folder.has_errors() {
        anyhow::bail!(
            "{} of {} string(s) missing in at least one language",
            stats.missing_strings,
            stats.strings
        );
    }
    if stats.failed_files > 0 {
        anyhow::bail!("{} file(s) could not be parsed", stats.failed_files);
    }

    if !json {
        println!(
            "   {} {} file(s), {} string(s) in {:.2}s",
            "Checked".green().bold(),
            stats.files,
            stats.strings,
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
