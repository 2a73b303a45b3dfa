use anyhow::Result;
use colored::Colorize;

use crate::commands::load_folder;
use crate::model::report;

/// Print what is known about one synthesized id in a folder
pub fn execute(target: &str, id: &str) -> Result<()> {
    let (folder, _config) = load_folder(target)?;

    // accept the bare identifier as shorthand for its first occurrence
    let string = folder
        .string_by_name(id)
        .or_else(|| folder.string_by_name(&format!("{}#0", id)))
        .ok_or_else(|| anyhow::anyhow!("no string named `{}` in {}", id, folder.name()))?;

    for line in report::string_details(&folder, string) {
        println!("{}", line);
    }

    let s = folder.string(string);
    for (language, &r) in &s.translations {
        let reference = folder.reference(r);
        let file = folder.file(reference.file);
        println!(
            "  {} {}:{} {:?}",
            language.green(),
            file.name(),
            reference.position,
            reference.text_value().unwrap_or_default()
        );
    }
    for language in &s.missing_in {
        match folder.missing_target(string, language) {
            Some(r) => {
                let reference = folder.reference(r);
                println!(
                    "  {} missing, nearest parent at {}:{}",
                    language.red(),
                    folder.file(reference.file).name(),
                    reference.position
                );
            }
            None => println!("  {} missing", language.red()),
        }
    }
    Ok(())
}
