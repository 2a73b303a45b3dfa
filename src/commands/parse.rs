use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::model::{decode_source, ComponentFolder};
use crate::rc::ast::{MenuItem, ResourceStatement};
use crate::rc::{parse_str, unescape_string};

/// Dump the statement tree of one file and the ids its entries get
pub fn execute(file: &str) -> Result<()> {
    let path = Path::new(file);
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", file))?;
    let text = decode_source(&bytes);

    let script = parse_str(&text).map_err(|e| anyhow::anyhow!("{}: {}", file, e))?;

    for statement in script.definitions() {
        print_statement(statement);
    }
    for diagnostic in &script.diagnostics {
        println!("{} {}", "note:".dimmed(), diagnostic);
    }
    if script.unclosed_scopes > 0 {
        println!(
            "{} {} block(s) still open at end of file",
            "warning:".yellow().bold(),
            script.unclosed_scopes
        );
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut folder = ComponentFolder::new(dir, dir);
    let id = folder.add_source(path.to_path_buf(), &text);
    folder.compare();

    println!();
    println!("{}", "Synthesized ids".cyan().bold());
    for &r in &folder.file(id).references {
        let reference = folder.reference(r);
        println!(
            "  {:>5}  {:<40} {}",
            reference.position.line,
            reference.id,
            reference.text_value().unwrap_or_default()
        );
    }
    Ok(())
}

fn print_statement(statement: &ResourceStatement) {
    match statement {
        ResourceStatement::Language(s) => {
            let sublang = s.sublang.as_ref().map(|t| t.text.as_str()).unwrap_or("-");
            println!("{} LANGUAGE {}, {}", s.position, s.lang.text, sublang);
        }
        ResourceStatement::Menu(menu) => {
            println!("{} {} {}", menu.position, menu.identifier.process(), menu.keyword.text);
            for item in &menu.items {
                print_menu_item(item, 1);
            }
        }
        ResourceStatement::Dialog(dialog) => {
            let caption = dialog.caption.as_ref().map(unescape_string).unwrap_or_default();
            let d = dialog.dimensions;
            println!(
                "{} {} {} {},{},{},{} {:?}",
                dialog.position,
                dialog.identifier.process(),
                dialog.entry_type.text,
                d.x,
                d.y,
                d.cx,
                d.cy,
                caption
            );
            for control in &dialog.controls {
                let text = control.text.as_ref().map(unescape_string).unwrap_or_default();
                println!(
                    "{}   {} {} [{}] {:?}",
                    control.position,
                    control.entry_type.text,
                    control.identifier.process(),
                    control.control_class,
                    text
                );
            }
        }
        ResourceStatement::StringTable(table) => {
            println!("{} STRINGTABLE", table.position);
            for entry in &table.entries {
                println!(
                    "{}   {} {:?}",
                    entry.position,
                    entry.identifier.process(),
                    unescape_string(&entry.text)
                );
            }
        }
        ResourceStatement::Recovery(_) => {}
    }
}

fn print_menu_item(item: &MenuItem, depth: usize) {
    let indent = "  ".repeat(depth);
    if item.separator {
        println!("{} {}{} SEPARATOR", item.position, indent, item.entry_type.text);
        return;
    }
    let id = item.identifier.as_ref().map(|e| e.process()).unwrap_or_default();
    let text = item.text.as_ref().map(unescape_string).unwrap_or_default();
    println!("{} {}{} {:?} {}", item.position, indent, item.entry_type.text, text, id);
    for child in &item.children {
        print_menu_item(child, depth + 1);
    }
}
