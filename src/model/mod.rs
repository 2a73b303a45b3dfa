//! Cross-language model of a component folder.
//!
//! References, strings and files live in per-folder arenas and point at each
//! other through the index types below.

pub mod folder;
pub mod index;
pub mod language;
pub mod report;
pub mod sublang;

use serde::Serialize;

pub use folder::{
    decode_source, ComponentFolder, FileFailure, FolderStats, LangFile, LoadError, TranslationString,
    TranslationStringReference,
};
pub use language::{resolve_language, LanguageState};
pub use sublang::{SubLang, SyntheticId, UnnamedCounter};

/// Index of a `TranslationStringReference` in its folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RefId(pub usize);

/// Index of a `TranslationString` in its folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StringId(pub usize);

/// Index of a `LangFile` in its folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub usize);
