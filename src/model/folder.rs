//! Component folders: every language file of one UI component, parsed and compared

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::language::{resolve_language, LanguageState};
use crate::model::sublang::{SubLang, UnnamedCounter};
use crate::model::{FileId, RefId, StringId};
use crate::rc::ast::{EntryKind, Expression, MenuItem, ResourceScript, ResourceStatement, TranslationEntry};
use crate::rc::lexer::unescape_string;
use crate::rc::parser::parse_str;
use crate::rc::position::Position;
use crate::rc::token::Token;
use crate::rc::ParseError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A language file that could not be loaded
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: LoadError,
}

/// One concrete occurrence of a translatable entry
#[derive(Debug, Clone)]
pub struct TranslationStringReference {
    pub id: String,
    pub language: String,
    pub file: FileId,
    pub position: Position,
    pub end: Position,
    pub kind: EntryKind,
    pub entry_type: Option<Token>,
    pub identifier: Option<Expression>,
    pub text: Option<Token>,
    /// Reference of the enclosing popup or dialog
    pub parent: Option<RefId>,
    pub string: StringId,
    pub previous: Option<RefId>,
    pub next: Option<RefId>,
}

impl TranslationStringReference {
    /// Decoded text value, if the entry has one
    pub fn text_value(&self) -> Option<String> {
        self.text.as_ref().map(unescape_string)
    }
}

/// A logical string, shared by every language that defines the same id
#[derive(Debug, Clone)]
pub struct TranslationString {
    pub name: String,
    pub lines: Vec<RefId>,
    pub translations: BTreeMap<String, RefId>,
    pub missing_in: BTreeSet<String>,
    pub parent: Option<StringId>,
}

impl TranslationString {
    pub fn is_missing(&self) -> bool {
        !self.missing_in.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LangFile {
    pub path: PathBuf,
    pub raw_lines: Vec<String>,
    /// 1-based line number to the references starting on it
    pub named_lines: BTreeMap<usize, Vec<RefId>>,
    /// References in source order
    pub references: Vec<RefId>,
    /// Sublanguages the file declares strings for
    pub languages: Vec<String>,
    pub failed: bool,
}

impl LangFile {
    fn new(path: PathBuf, text: &str) -> Self {
        LangFile {
            path,
            raw_lines: split_lines(text),
            named_lines: BTreeMap::new(),
            references: Vec::new(),
            languages: Vec::new(),
            failed: false,
        }
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FolderStats {
    pub files: usize,
    pub failed_files: usize,
    pub strings: usize,
    pub missing_strings: usize,
}

/// All language files of one directory
#[derive(Debug)]
pub struct ComponentFolder {
    pub root: PathBuf,
    pub directory: PathBuf,
    pub files: Vec<LangFile>,
    pub sub_langs: BTreeMap<String, SubLang>,
    pub references: Vec<TranslationStringReference>,
    pub strings: Vec<TranslationString>,
    strings_by_name: HashMap<String, StringId>,
    pub failures: Vec<FileFailure>,
}

/// Decode file bytes, honouring UTF-8 and UTF-16 byte order marks
pub fn decode_source(bytes: &[u8]) -> String {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let chunks = bytes.chunks_exact(2);
    let truncated = !chunks.remainder().is_empty();
    let units = chunks.map(|pair| unit([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if truncated {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

/// Split on `\r\n`, `\r` or `\n`, numbering lines the way the lexer does
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' => lines.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

impl ComponentFolder {
    pub fn new(root: impl Into<PathBuf>, directory: impl Into<PathBuf>) -> Self {
        ComponentFolder {
            root: root.into(),
            directory: directory.into(),
            files: Vec::new(),
            sub_langs: BTreeMap::new(),
            references: Vec::new(),
            strings: Vec::new(),
            strings_by_name: HashMap::new(),
            failures: Vec::new(),
        }
    }

    /// Directory relative to the scan root
    pub fn name(&self) -> String {
        match self.directory.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.display().to_string(),
            Err(_) => self.directory.display().to_string(),
        }
    }

    /// Parse every `*.{extension}` file in the directory, then compare.
    ///
    /// Only listing the directory can fail; unreadable or malformed files are
    /// recorded in `failures`.
    pub fn load(&mut self, extension: &str) -> std::io::Result<()> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.is_file() && has_extension(&path, extension) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.add_file(path);
        }
        self.compare();
        Ok(())
    }

    pub fn add_file(&mut self, path: PathBuf) -> FileId {
        match fs::read(&path) {
            Ok(bytes) => {
                let text = decode_source(&bytes);
                self.add_source(path, &text)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read: {}", e);
                let id = FileId(self.files.len());
                let mut file = LangFile::new(path.clone(), "");
                file.failed = true;
                self.files.push(file);
                self.failures.push(FileFailure {
                    path,
                    error: LoadError::Io(e),
                });
                id
            }
        }
    }

    /// Parse one language file held in memory and register its strings.
    ///
    /// Call `compare` once every file of the folder has been added.
    pub fn add_source(&mut self, path: PathBuf, text: &str) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(LangFile::new(path.clone(), text));

        match parse_str(text) {
            Ok(script) => {
                if script.unclosed_scopes > 0 {
                    tracing::debug!(path = %path.display(), depth = script.unclosed_scopes, "unclosed blocks at end of file");
                }
                self.register_script(id, &script);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to parse: {}", e);
                self.files[id.0].failed = true;
                self.failures.push(FileFailure {
                    path,
                    error: LoadError::Parse(e),
                });
            }
        }
        id
    }

    fn register_script(&mut self, file: FileId, script: &ResourceScript) {
        let mut language = LanguageState::default();
        let mut top_level = UnnamedCounter::default();

        for statement in script.definitions() {
            match statement {
                ResourceStatement::Language(s) => {
                    let sublang = s.sublang.as_ref().map(|t| t.text.as_str());
                    language = resolve_language(&s.lang.text, sublang, &language);
                }
                ResourceStatement::Menu(menu) => {
                    let mut counter = UnnamedCounter::default();
                    let prefix = menu.identifier.process();
                    for item in &menu.items {
                        self.register_menu_item(file, &language, &prefix, item, &mut counter, None);
                    }
                }
                ResourceStatement::Dialog(dialog) => {
                    let (parent, _) = self.add_named_string(file, &language, "", dialog, &mut top_level, None);
                    let mut counter = UnnamedCounter::default();
                    let prefix = dialog.identifier.process();
                    for control in &dialog.controls {
                        self.add_named_string(file, &language, &prefix, control, &mut counter, Some(parent));
                    }
                }
                ResourceStatement::StringTable(table) => {
                    let mut counter = UnnamedCounter::default();
                    for entry in &table.entries {
                        self.add_named_string(file, &language, "", entry, &mut counter, None);
                    }
                }
                ResourceStatement::Recovery(_) => {}
            }
        }
    }

    fn register_menu_item(
        &mut self,
        file: FileId,
        language: &LanguageState,
        prefix: &str,
        item: &MenuItem,
        counter: &mut UnnamedCounter,
        parent: Option<RefId>,
    ) {
        if item.separator {
            return;
        }
        let (reference, base) = self.add_named_string(file, language, prefix, item, counter, parent);

        if item.is_popup() {
            let prefix = format!("{}_{}", prefix, base);
            let mut children = UnnamedCounter::default();
            for child in &item.children {
                self.register_menu_item(file, language, &prefix, child, &mut children, Some(reference));
            }
        }
    }

    fn add_named_string(
        &mut self,
        file: FileId,
        language: &LanguageState,
        prefix: &str,
        entry: &dyn TranslationEntry,
        counter: &mut UnnamedCounter,
        parent: Option<RefId>,
    ) -> (RefId, String) {
        let sub_lang = self
            .sub_langs
            .entry(language.name.clone())
            .or_insert_with(|| SubLang::new(&language.name, &language.neutral, file));
        let synthetic = sub_lang.synthesize_id(prefix, entry, counter);
        let reference = RefId(self.references.len());
        sub_lang.insert(synthetic.id.clone(), reference);

        let string = match self.strings_by_name.get(&synthetic.id) {
            Some(&existing) => existing,
            None => {
                let id = StringId(self.strings.len());
                let parent_string = parent.map(|p| self.references[p.0].string);
                self.strings.push(TranslationString {
                    name: synthetic.id.clone(),
                    lines: Vec::new(),
                    translations: BTreeMap::new(),
                    missing_in: BTreeSet::new(),
                    parent: parent_string,
                });
                self.strings_by_name.insert(synthetic.id.clone(), id);
                id
            }
        };
        let shared = &mut self.strings[string.0];
        shared.lines.push(reference);
        shared.translations.entry(language.name.clone()).or_insert(reference);

        let entry_type = entry.entry_type().cloned();
        let identifier = entry.identifier().cloned();
        // Dialog headers put the identifier before the keyword
        let position = identifier
            .as_ref()
            .and_then(|e| e.tokens.first())
            .map_or(entry.position(), |t| t.start.min(entry.position()));
        let text = entry.text_value().cloned();
        let end = [
            entry_type.as_ref().map(|t| t.end),
            identifier.as_ref().map(|e| e.end()),
            text.as_ref().map(|t| t.end),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(position);

        self.references.push(TranslationStringReference {
            id: synthetic.id,
            language: language.name.clone(),
            file,
            position,
            end,
            kind: entry.kind(),
            entry_type,
            identifier,
            text,
            parent,
            string,
            previous: None,
            next: None,
        });

        let lang_file = &mut self.files[file.0];
        if !lang_file.languages.contains(&language.name) {
            lang_file.languages.push(language.name.clone());
        }
        lang_file.named_lines.entry(position.line).or_default().push(reference);
        lang_file.references.push(reference);

        (reference, synthetic.base)
    }

    /// Work out, for every string, which sublanguages lack it.
    ///
    /// A sublanguage is satisfied by its neutral language unless it is the
    /// neutral language itself.
    pub fn compare(&mut self) {
        let languages: Vec<(&str, &str)> = self
            .sub_langs
            .values()
            .map(|s| (s.name.as_str(), s.neutral.as_str()))
            .collect();

        for string in &mut self.strings {
            string.missing_in.clear();
            for &(name, neutral) in &languages {
                if string.translations.contains_key(name) {
                    continue;
                }
                if name == neutral || !string.translations.contains_key(neutral) {
                    string.missing_in.insert(name.to_string());
                }
            }
        }

        for file in &self.files {
            let refs = &file.references;
            for (i, &r) in refs.iter().enumerate() {
                let reference = &mut self.references[r.0];
                reference.previous = if i > 0 { Some(refs[i - 1]) } else { None };
                reference.next = refs.get(i + 1).copied();
            }
        }
    }

    pub fn reference(&self, id: RefId) -> &TranslationStringReference {
        &self.references[id.0]
    }

    pub fn string(&self, id: StringId) -> &TranslationString {
        &self.strings[id.0]
    }

    pub fn file(&self, id: FileId) -> &LangFile {
        &self.files[id.0]
    }

    pub fn string_by_name(&self, name: &str) -> Option<StringId> {
        self.strings_by_name.get(name).copied()
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> {
        (0..self.files.len()).map(FileId)
    }

    pub fn string_ids(&self) -> impl Iterator<Item = StringId> {
        (0..self.strings.len()).map(StringId)
    }

    /// Strings missing in at least one language the file declares
    pub fn missing_for_file(&self, file: FileId) -> impl Iterator<Item = StringId> + '_ {
        let languages = &self.files[file.0].languages;
        self.string_ids().filter(move |&s| {
            self.strings[s.0]
                .missing_in
                .iter()
                .any(|lang| languages.contains(lang))
        })
    }

    pub fn file_has_errors(&self, file: FileId) -> bool {
        self.missing_for_file(file).next().is_some()
    }

    pub fn has_errors(&self) -> bool {
        self.file_ids().any(|f| self.file_has_errors(f))
    }

    pub fn stats(&self) -> FolderStats {
        FolderStats {
            files: self.files.len(),
            failed_files: self.failures.len(),
            strings: self.strings.len(),
            missing_strings: self.strings.iter().filter(|s| s.is_missing()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str = r#"
LANGUAGE LANG_ENGLISH, SUBLANG_ENGLISH_US
STRINGTABLE
BEGIN
    IDS_OK "OK"
    IDS_CANCEL "Cancel"
END
"#;

    const GERMAN: &str = r#"
LANGUAGE LANG_GERMAN, SUBLANG_DEFAULT
STRINGTABLE
BEGIN
    IDS_OK "OK"
END
"#;

    fn folder(sources: &[(&str, &str)]) -> ComponentFolder {
        let mut folder = ComponentFolder::new("/src", "/src/comp");
        for (name, text) in sources {
            folder.add_source(PathBuf::from(format!("/src/comp/{}", name)), text);
        }
        folder.compare();
        folder
    }

    #[test]
    fn test_decode_source_boms() {
        assert_eq!(decode_source(b"\xEF\xBB\xBFabc"), "abc");
        assert_eq!(decode_source(b"\xFF\xFEa\x00b\x00"), "ab");
        assert_eq!(decode_source(b"\xFE\xFF\x00a\x00b"), "ab");
        assert_eq!(decode_source(b"plain"), "plain");
    }

    #[test]
    fn test_truncated_utf16_is_visible() {
        assert_eq!(decode_source(b"\xFF\xFEa\x00b"), "a\u{FFFD}");
        assert_eq!(decode_source(b"\xFE\xFF\x00a\x00"), "a\u{FFFD}");
    }

    #[test]
    fn test_raw_lines_follow_lexer_line_breaks() {
        let source = "STRINGTABLE\rBEGIN\r  IDS_A \"a\"\r\nEND\n";
        let folder = folder(&[("en-US.rc", source)]);
        let file = folder.file(FileId(0));
        assert_eq!(file.raw_lines, vec!["STRINGTABLE", "BEGIN", "  IDS_A \"a\"", "END"]);

        let reference = folder.reference(file.references[0]);
        assert_eq!(reference.position.line, 3);
        assert_eq!(file.raw_lines[reference.position.line - 1], "  IDS_A \"a\"");
        assert_eq!(file.named_lines.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_split_lines_keeps_blank_lines() {
        assert_eq!(split_lines("a\r\rb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_missing_string_is_reported() {
        let folder = folder(&[("en-US.rc", ENGLISH), ("de-DE.rc", GERMAN)]);

        let cancel = folder.string(folder.string_by_name("IDS_CANCEL#0").unwrap());
        assert_eq!(
            cancel.missing_in.iter().collect::<Vec<_>>(),
            vec!["GERMAN_DEFAULT"]
        );
        let ok = folder.string(folder.string_by_name("IDS_OK#0").unwrap());
        assert!(ok.missing_in.is_empty());

        assert!(!folder.file_has_errors(FileId(0)));
        assert!(folder.file_has_errors(FileId(1)));
        assert!(folder.has_errors());
    }

    #[test]
    fn test_neutral_translation_satisfies_sublanguage() {
        let neutral = "LANGUAGE LANG_GERMAN, SUBLANG_NEUTRAL\nSTRINGTABLE { IDS_CANCEL \"Abbrechen\" }";
        let folder = folder(&[("en-US.rc", ENGLISH), ("de-DE.rc", GERMAN), ("de.rc", neutral)]);

        let cancel = folder.string(folder.string_by_name("IDS_CANCEL#0").unwrap());
        assert!(cancel.missing_in.is_empty());

        // the neutral file itself lacks IDS_OK and has no fallback
        let ok = folder.string(folder.string_by_name("IDS_OK#0").unwrap());
        assert_eq!(ok.missing_in.iter().collect::<Vec<_>>(), vec!["GERMAN"]);
    }

    #[test]
    fn test_dialog_controls_hang_off_dialog() {
        let source = r#"
IDD_MAIN DIALOGEX 0, 0, 100, 50
CAPTION "Main"
BEGIN
    LTEXT "Hello", IDC_LABEL, 5, 5, 50, 10
END
"#;
        let folder = folder(&[("en-US.rc", source)]);
        let dialog = folder.string_by_name("IDD_MAIN#0").unwrap();
        let label = folder.string(folder.string_by_name("IDD_MAIN_IDC_LABEL#0").unwrap());
        assert_eq!(label.parent, Some(dialog));

        let reference = folder.reference(label.lines[0]);
        assert_eq!(reference.text_value().as_deref(), Some("Hello"));
        assert_eq!(reference.position.line, 5);
    }

    #[test]
    fn test_menu_prefixes_nest() {
        let source = r#"
IDM_MAIN MENU
BEGIN
    POPUP "&File"
    BEGIN
        MENUITEM "&Open", ID_OPEN
        MENUITEM SEPARATOR
        POPUP "Recent", ID_RECENT
        BEGIN
            MENUITEM "None", -1
        END
    END
END
"#;
        let folder = folder(&[("en-US.rc", source)]);
        let names: Vec<&str> = folder.strings.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "IDM_MAIN_POPUP__0#0",
                "IDM_MAIN_POPUP__0_ID_OPEN#0",
                "IDM_MAIN_POPUP__0_ID_RECENT#0",
                "IDM_MAIN_POPUP__0_ID_RECENT_MENUITEM_-1_0#0",
            ]
        );
        let open = folder.string(StringId(1));
        assert_eq!(open.parent, Some(StringId(0)));
    }

    #[test]
    fn test_parse_failure_is_contained() {
        let broken = "IDM_X MENU\nBEGIN\n    MENUITEM \"Broken\nEND\n";
        let folder = folder(&[("en-US.rc", ENGLISH), ("fr-FR.rc", broken)]);

        assert_eq!(folder.failures.len(), 1);
        assert!(folder.files[1].failed);
        assert!(matches!(
            folder.failures[0].error,
            LoadError::Parse(ParseError::UnterminatedStringLiteral { .. })
        ));
        assert_eq!(folder.strings.len(), 2);
    }

    #[test]
    fn test_references_are_linked_in_file_order() {
        let folder = folder(&[("en-US.rc", ENGLISH)]);
        let refs = &folder.files[0].references;
        assert_eq!(folder.reference(refs[0]).next, Some(refs[1]));
        assert_eq!(folder.reference(refs[1]).previous, Some(refs[0]));
        assert_eq!(folder.reference(refs[1]).next, None);
    }
}
