//! Per-language symbol tables and identifier synthesis

use std::collections::HashMap;

use crate::model::{FileId, RefId};
use crate::rc::ast::TranslationEntry;

/// Counters for anonymous entries, one per enclosing scope.
///
/// Keys are `{entry type}_{raw id}` so that unnamed group boxes and unnamed
/// static texts count independently.
#[derive(Debug, Default, Clone)]
pub struct UnnamedCounter {
    counts: HashMap<String, usize>,
}

impl UnnamedCounter {
    pub fn next(&mut self, key: &str) -> usize {
        let slot = self.counts.entry(key.to_string()).or_insert(0);
        let value = *slot;
        *slot += 1;
        value
    }
}

/// Identifier chosen for one occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticId {
    /// Name before prefixing and numbering (`IDC_OK`, `GROUPBOX_-1_0`)
    pub base: String,
    /// Full unique key (`IDD_MAIN_IDC_OK#0`)
    pub id: String,
}

/// Entry identifiers that name nothing in particular
pub fn is_degenerate_identifier(id: &str) -> bool {
    id.is_empty() || id == "-1" || id == "IDC_STATIC"
}

/// One resolved (language, sublanguage) pair of a component folder
#[derive(Debug, Clone)]
pub struct SubLang {
    pub name: String,
    pub neutral: String,
    /// File the sublanguage was first seen in
    pub source: FileId,
    pub strings: HashMap<String, RefId>,
    /// Occurrences in insertion order
    pub references: Vec<RefId>,
}

impl SubLang {
    pub fn new(name: impl Into<String>, neutral: impl Into<String>, source: FileId) -> Self {
        SubLang {
            name: name.into(),
            neutral: neutral.into(),
            source,
            strings: HashMap::new(),
            references: Vec::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.strings.contains_key(id)
    }

    /// Pick a name for `entry` that is stable across languages and unused in
    /// this sublanguage. Does not register it.
    pub fn synthesize_id(
        &self,
        prefix: &str,
        entry: &dyn TranslationEntry,
        counter: &mut UnnamedCounter,
    ) -> SyntheticId {
        let prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}_", prefix)
        };

        let mut base = entry.identifier().map(|e| e.process()).unwrap_or_default();
        if is_degenerate_identifier(&base) {
            let type_key = match entry.entry_type() {
                Some(token) if !token.text.trim().is_empty() => token.text.as_str(),
                _ => "UNNAMED",
            };
            let key = format!("{}_{}", type_key, base);
            let n = counter.next(&key);
            base = format!("{}_{}", key, n);
        }

        let mut number = 0;
        let mut id = format!("{}{}#{}", prefix, base, number);
        while self.contains(&id) {
            number += 1;
            id = format!("{}{}#{}", prefix, base, number);
        }

        SyntheticId { base, id }
    }

    pub(crate) fn insert(&mut self, id: String, reference: RefId) {
        self.strings.insert(id, reference);
        self.references.push(reference);
    }
}
