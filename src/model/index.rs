//! Navigation over a compared folder

use crate::model::folder::ComponentFolder;
use crate::model::{FileId, RefId, StringId};
use crate::rc::position::Span;

impl ComponentFolder {
    /// Source range covered by a reference, from its keyword to its last token
    pub fn span(&self, reference: RefId) -> Span {
        let r = self.reference(reference);
        Span::new(r.position, r.end)
    }

    pub fn next_in_file(&self, reference: RefId) -> Option<RefId> {
        self.reference(reference).next
    }

    pub fn previous_in_file(&self, reference: RefId) -> Option<RefId> {
        self.reference(reference).previous
    }

    /// Next reference in the same file whose string is missing somewhere
    pub fn next_missing_in_file(&self, reference: RefId) -> Option<RefId> {
        let mut current = self.next_in_file(reference);
        while let Some(r) = current {
            if self.string(self.reference(r).string).is_missing() {
                return Some(r);
            }
            current = self.next_in_file(r);
        }
        None
    }

    pub fn next_string(&self, string: StringId) -> Option<StringId> {
        let next = StringId(string.0 + 1);
        (next.0 < self.strings.len()).then_some(next)
    }

    pub fn previous_string(&self, string: StringId) -> Option<StringId> {
        string.0.checked_sub(1).map(StringId)
    }

    pub fn references_at_line(&self, file: FileId, line: usize) -> &[RefId] {
        self.file(file)
            .named_lines
            .get(&line)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Innermost reference whose span covers the byte offset
    pub fn reference_at(&self, file: FileId, offset: usize) -> Option<RefId> {
        self.file(file)
            .references
            .iter()
            .copied()
            .filter(|&r| self.span(r).contains(offset))
            .min_by_key(|&r| self.span(r).len())
    }

    /// Where to look when `string` is missing in `language`: the nearest
    /// enclosing popup or dialog that does exist in that language.
    pub fn missing_target(&self, string: StringId, language: &str) -> Option<RefId> {
        let mut current = self.string(string).parent;
        while let Some(s) = current {
            let parent = self.string(s);
            if let Some(&r) = parent.translations.get(language) {
                return Some(r);
            }
            current = parent.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const ENGLISH: &str = "LANGUAGE LANG_ENGLISH, SUBLANG_ENGLISH_US
IDD_ABOUT DIALOG 0, 0, 100, 50
CAPTION \"About\"
BEGIN
    LTEXT \"Version\", IDC_VERSION, 5, 5, 50, 10
    LTEXT \"Copyright\", IDC_COPY, 5, 20, 50, 10
END
STRINGTABLE
BEGIN
    IDS_TITLE \"Title\"
END
";

    const FRENCH: &str = "LANGUAGE LANG_FRENCH, SUBLANG_FRENCH
IDD_ABOUT DIALOG 0, 0, 100, 50
CAPTION \"A propos\"
BEGIN
    LTEXT \"Version\", IDC_VERSION, 5, 5, 50, 10
END
";

    fn folder() -> ComponentFolder {
        let mut folder = ComponentFolder::new("/src", "/src/about");
        folder.add_source(PathBuf::from("/src/about/en-US.rc"), ENGLISH);
        folder.add_source(PathBuf::from("/src/about/fr-FR.rc"), FRENCH);
        folder.compare();
        folder
    }

    #[test]
    fn test_line_and_offset_lookup() {
        let folder = folder();
        let english = FileId(0);

        let at_caption_line = folder.references_at_line(english, 2);
        assert_eq!(at_caption_line.len(), 1);
        assert_eq!(folder.reference(at_caption_line[0]).id, "IDD_ABOUT#0");
        assert!(folder.references_at_line(english, 4).is_empty());

        let offset = ENGLISH.find("IDC_COPY").unwrap();
        let found = folder.reference_at(english, offset).unwrap();
        assert_eq!(folder.reference(found).id, "IDD_ABOUT_IDC_COPY#0");
        assert!(folder.reference_at(english, 0).is_none());
    }

    #[test]
    fn test_dialog_span_starts_at_identifier() {
        let folder = folder();
        let english = FileId(0);

        let offset = ENGLISH.find("IDD_ABOUT").unwrap();
        let found = folder.reference_at(english, offset + 2).unwrap();
        assert_eq!(folder.reference(found).id, "IDD_ABOUT#0");
        assert_eq!(folder.span(found).start.offset, offset);
    }

    #[test]
    fn test_jump_to_next_missing() {
        let folder = folder();
        let english = folder.file(FileId(0));
        let first = english.references[0];

        let next = folder.next_missing_in_file(first).unwrap();
        assert_eq!(folder.reference(next).id, "IDD_ABOUT_IDC_COPY#0");
        let after = folder.next_missing_in_file(next).unwrap();
        assert_eq!(folder.reference(after).id, "IDS_TITLE#0");
        assert!(folder.next_missing_in_file(after).is_none());
    }

    #[test]
    fn test_missing_target_walks_parents() {
        let folder = folder();
        let copy = folder.string_by_name("IDD_ABOUT_IDC_COPY#0").unwrap();
        let target = folder.missing_target(copy, "FRENCH").unwrap();
        let target = folder.reference(target);
        assert_eq!(target.id, "IDD_ABOUT#0");
        assert_eq!(target.file, FileId(1));

        let title = folder.string_by_name("IDS_TITLE#0").unwrap();
        assert!(folder.missing_target(title, "FRENCH").is_none());
    }

    #[test]
    fn test_string_navigation() {
        let folder = folder();
        let first = StringId(0);
        assert_eq!(folder.previous_string(first), None);
        assert_eq!(folder.next_string(first), Some(StringId(1)));
        let last = StringId(folder.strings.len() - 1);
        assert_eq!(folder.next_string(last), None);
    }

    #[test]
    fn test_span_is_ordered() {
        let folder = folder();
        for id in 0..folder.references.len() {
            let span = folder.span(RefId(id));
            assert!(span.start <= span.end);
        }
    }
}
