//! Plain-text and JSON views of a compared folder

use serde::Serialize;

use crate::model::folder::{ComponentFolder, FolderStats};
use crate::model::{FileId, StringId};

fn seen_in(folder: &ComponentFolder, string: StringId) -> String {
    folder
        .string(string)
        .translations
        .iter()
        .map(|(lang, &r)| format!("{}({})", lang, folder.file(folder.reference(r).file).name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Description of one logical string
pub fn string_details(folder: &ComponentFolder, string: StringId) -> Vec<String> {
    let s = folder.string(string);
    let mut lines = vec![format!("Internal ID: {}", s.name)];

    if !s.translations.is_empty() {
        lines.push(format!("Translated to: {}", seen_in(folder, string)));
    }

    if !s.missing_in.is_empty() {
        let missing: Vec<String> = s
            .missing_in
            .iter()
            .map(|lang| match folder.sub_langs.get(lang) {
                Some(sub) => format!("{}({})", lang, folder.file(sub.source).name()),
                None => lang.clone(),
            })
            .collect();
        lines.push(format!("Missing in: {}", missing.join(", ")));
    }
    lines
}

/// Strings the file's languages lack, with where they do exist
pub fn file_details(folder: &ComponentFolder, file: FileId) -> Vec<String> {
    folder
        .missing_for_file(file)
        .map(|s| format!("Missing {}, seen in: {}", folder.string(s).name, seen_in(folder, s)))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct StringSummary {
    pub id: String,
    pub parent: Option<String>,
    pub translated: Vec<String>,
    pub missing_in: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub languages: Vec<String>,
    pub has_errors: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderSummary {
    pub name: String,
    pub path: String,
    pub has_errors: bool,
    pub stats: FolderStats,
    pub files: Vec<FileSummary>,
    pub missing: Vec<StringSummary>,
}

pub fn string_summary(folder: &ComponentFolder, string: StringId) -> StringSummary {
    let s = folder.string(string);
    StringSummary {
        id: s.name.clone(),
        parent: s.parent.map(|p| folder.string(p).name.clone()),
        translated: s.translations.keys().cloned().collect(),
        missing_in: s.missing_in.iter().cloned().collect(),
    }
}

pub fn folder_summary(folder: &ComponentFolder) -> FolderSummary {
    let files = folder
        .file_ids()
        .map(|f| {
            let file = folder.file(f);
            let error = folder
                .failures
                .iter()
                .find(|failure| failure.path == file.path)
                .map(|failure| failure.error.to_string());
            FileSummary {
                name: file.name(),
                languages: file.languages.clone(),
                has_errors: folder.file_has_errors(f),
                error,
            }
        })
        .collect();

    let missing = folder
        .string_ids()
        .filter(|&s| folder.string(s).is_missing())
        .map(|s| string_summary(folder, s))
        .collect();

    FolderSummary {
        name: folder.name(),
        path: folder.directory.display().to_string(),
        has_errors: folder.has_errors(),
        stats: folder.stats(),
        files,
        missing,
    }
}
