//! Resolution of `LANGUAGE` statements into sublanguage names

/// Language in effect while walking a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageState {
    /// Sublanguage name, e.g. `GERMAN_DEFAULT` or `ENGLISH_US`
    pub name: String,
    /// Bare language the sublanguage falls back to, e.g. `GERMAN`
    pub neutral: String,
}

impl Default for LanguageState {
    fn default() -> Self {
        LanguageState {
            name: "NEUTRAL".to_string(),
            neutral: "NEUTRAL".to_string(),
        }
    }
}

fn strip<'a>(text: &'a str, prefix: &str) -> &'a str {
    text.strip_prefix(prefix).unwrap_or(text)
}

/// Apply `LANGUAGE lang[, sublang]` on top of the current state.
///
/// `LANG_`/`SUBLANG_` prefixes are dropped. `SUBLANG_NEUTRAL` selects the bare
/// language, `SUBLANG_DEFAULT` becomes `{LANG}_DEFAULT` and any other sublang
/// names itself. Without a sublang the current name is kept.
pub fn resolve_language(lang: &str, sublang: Option<&str>, current: &LanguageState) -> LanguageState {
    let lang = strip(lang, "LANG_");
    let sublang = match sublang {
        Some(text) => strip(text, "SUBLANG_"),
        None => current.name.as_str(),
    };

    let mut name = match sublang {
        "NEUTRAL" => lang.to_string(),
        "DEFAULT" => format!("{}_DEFAULT", lang),
        other => other.to_string(),
    };
    if name == "DEFAULT" {
        name = "ENGLISH_US".to_string();
    }

    LanguageState {
        name,
        neutral: lang.to_string(),
    }
}
