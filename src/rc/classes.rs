//! Window class names for dialog controls

use crate::rc::token::TokenKind;

const KNOWN_CLASSES: &[(&str, &str)] = &[
    ("PROGRESS_CLASSA", "msctls_progress32"),
    ("PROGRESS_CLASSW", "msctls_progress32"),
    ("PROGRESS_CLASS", "msctls_progress32"),
    ("UPDOWN_CLASSA", "msctls_updown32"),
    ("UPDOWN_CLASSW", "msctls_updown32"),
    ("UPDOWN_CLASS", "msctls_updown32"),
    ("ANIMATE_CLASSA", "SysAnimate32"),
    ("ANIMATE_CLASSW", "SysAnimate32"),
    ("ANIMATE_CLASS", "SysAnimate32"),
    ("WC_TREEVIEWA", "SysTreeView32"),
    ("WC_TREEVIEWW", "SysTreeView32"),
    ("WC_TREEVIEW", "SysTreeView32"),
];

/// Map a class macro used in a `CONTROL` line to the registered class name.
/// Unknown macros fall back to `STATIC`.
pub fn translate(ident: &str) -> String {
    match KNOWN_CLASSES.iter().find(|(name, _)| *name == ident) {
        Some((_, class)) => class.to_string(),
        None => {
            tracing::debug!(class = ident, "unknown control class, assuming STATIC");
            "STATIC".to_string()
        }
    }
}

/// Implied class of the shorthand control keywords
pub fn default_class(keyword: TokenKind) -> &'static str {
    match keyword {
        TokenKind::PushButton
        | TokenKind::DefPushButton
        | TokenKind::GroupBox
        | TokenKind::CheckBox
        | TokenKind::AutoCheckBox
        | TokenKind::RadioButton
        | TokenKind::AutoRadioButton => "BUTTON",
        TokenKind::EditText => "EDIT",
        TokenKind::ListBox => "LISTBOX",
        TokenKind::ComboBox => "COMBOBOX",
        _ => "STATIC",
    }
}
