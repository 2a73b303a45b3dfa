//! Statement tree produced by the parser

use crate::rc::error::Diagnostic;
use crate::rc::position::{Position, Span};
use crate::rc::token::{Token, TokenKind};

/// Operator-joined run of tokens, kept unevaluated.
///
/// Never empty: the parser only builds one after consuming at least one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub tokens: Vec<Token>,
}

impl Expression {
    /// Display form: token texts concatenated without separators
    pub fn process(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn start(&self) -> Position {
        self.tokens.first().map(|t| t.start).unwrap_or_default()
    }

    pub fn end(&self) -> Position {
        self.tokens.last().map(|t| t.end).unwrap_or_default()
    }

    pub fn span(&self) -> Span {
        Span::new(self.start(), self.end())
    }

    /// Evaluate a `+`/`-` chain of integer literals.
    ///
    /// Dimension fields only ever need signed literal sums; anything else
    /// (identifiers, other operators) yields `None`.
    pub fn solve(&self) -> Option<i64> {
        let mut total = 0i64;
        let mut negate = false;
        let mut expect_operand = true;

        for token in &self.tokens {
            match token.kind {
                TokenKind::Minus => {
                    negate = !negate;
                    expect_operand = true;
                }
                TokenKind::Plus if !expect_operand => expect_operand = true,
                TokenKind::Integer | TokenKind::HexInt if expect_operand => {
                    let value = parse_integer(&token.text)?;
                    let value = if negate { value.checked_neg()? } else { value };
                    total = total.checked_add(value)?;
                    negate = false;
                    expect_operand = false;
                }
                _ => return None,
            }
        }

        if expect_operand {
            None
        } else {
            Some(total)
        }
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub size: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageStatement {
    pub position: Position,
    pub lang: Token,
    pub sublang: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuDefinition {
    pub position: Position,
    pub identifier: Expression,
    /// `MENU` or `MENUEX`
    pub keyword: Token,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub position: Position,
    /// `MENUITEM` or `POPUP`
    pub entry_type: Token,
    pub identifier: Option<Expression>,
    pub text: Option<Token>,
    pub separator: bool,
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn is_popup(&self) -> bool {
        self.entry_type.kind == TokenKind::Popup
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogDefinition {
    pub position: Position,
    /// `DIALOG` or `DIALOGEX`
    pub entry_type: Token,
    pub identifier: Expression,
    pub caption: Option<Token>,
    pub font: Option<Font>,
    pub style: Option<Expression>,
    pub ex_style: Option<Expression>,
    pub dimensions: Dimensions,
    pub controls: Vec<DialogControl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogControl {
    pub position: Position,
    pub entry_type: Token,
    pub identifier: Expression,
    /// Literal label; `None` when the control names a resource id instead
    pub text: Option<Token>,
    pub dimensions: Dimensions,
    pub style: Option<Expression>,
    pub control_class: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringTable {
    pub position: Position,
    pub entries: Vec<StringTableEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringTableEntry {
    pub position: Position,
    pub identifier: Expression,
    pub text: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrorRecovery {
    pub position: Position,
    pub skipped: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceStatement {
    Language(LanguageStatement),
    Menu(MenuDefinition),
    Dialog(DialogDefinition),
    StringTable(StringTable),
    Recovery(ParseErrorRecovery),
}

impl ResourceStatement {
    pub fn position(&self) -> Position {
        match self {
            ResourceStatement::Language(s) => s.position,
            ResourceStatement::Menu(s) => s.position,
            ResourceStatement::Dialog(s) => s.position,
            ResourceStatement::StringTable(s) => s.position,
            ResourceStatement::Recovery(s) => s.position,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceScript {
    pub statements: Vec<ResourceStatement>,
    pub diagnostics: Vec<Diagnostic>,
    /// Scopes still open when the input ended
    pub unclosed_scopes: usize,
}

impl ResourceScript {
    /// Statements without the skipped-token noise
    pub fn definitions(&self) -> impl Iterator<Item = &ResourceStatement> {
        self.statements
            .iter()
            .filter(|s| !matches!(s, ResourceStatement::Recovery(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum EntryKind {
    MenuItem,
    Dialog,
    DialogControl,
    StringTableEntry,
}

/// Capability shared by the statements that carry translatable text
pub trait TranslationEntry {
    fn kind(&self) -> EntryKind;
    fn position(&self) -> Position;
    /// Raw keyword that introduced the entry, if any
    fn entry_type(&self) -> Option<&Token>;
    fn identifier(&self) -> Option<&Expression>;
    fn text_value(&self) -> Option<&Token>;
}

impl TranslationEntry for MenuItem {
    fn kind(&self) -> EntryKind {
        EntryKind::MenuItem
    }
    fn position(&self) -> Position {
        self.position
    }
    fn entry_type(&self) -> Option<&Token> {
        Some(&self.entry_type)
    }
    fn identifier(&self) -> Option<&Expression> {
        self.identifier.as_ref()
    }
    fn text_value(&self) -> Option<&Token> {
        self.text.as_ref()
    }
}

impl TranslationEntry for DialogDefinition {
    fn kind(&self) -> EntryKind {
        EntryKind::Dialog
    }
    fn position(&self) -> Position {
        self.position
    }
    fn entry_type(&self) -> Option<&Token> {
        Some(&self.entry_type)
    }
    fn identifier(&self) -> Option<&Expression> {
        Some(&self.identifier)
    }
    fn text_value(&self) -> Option<&Token> {
        self.caption.as_ref()
    }
}

impl TranslationEntry for DialogControl {
    fn kind(&self) -> EntryKind {
        EntryKind::DialogControl
    }
    fn position(&self) -> Position {
        self.position
    }
    fn entry_type(&self) -> Option<&Token> {
        Some(&self.entry_type)
    }
    fn identifier(&self) -> Option<&Expression> {
        Some(&self.identifier)
    }
    fn text_value(&self) -> Option<&Token> {
        self.text.as_ref()
    }
}

impl TranslationEntry for StringTableEntry {
    fn kind(&self) -> EntryKind {
        EntryKind::StringTableEntry
    }
    fn position(&self) -> Position {
        self.position
    }
    fn entry_type(&self) -> Option<&Token> {
        None
    }
    fn identifier(&self) -> Option<&Expression> {
        Some(&self.identifier)
    }
    fn text_value(&self) -> Option<&Token> {
        Some(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rc::lexer::tokenize;

    fn expr(source: &str) -> Expression {
        Expression {
            tokens: tokenize(source).unwrap(),
        }
    }

    #[test]
    fn test_process_concatenates_text() {
        assert_eq!(expr("WS_CHILD | WS_VISIBLE").process(), "WS_CHILD|WS_VISIBLE");
        assert_eq!(expr("-1").process(), "-1");
    }

    #[test]
    fn test_solve_signed_sums() {
        assert_eq!(expr("42").solve(), Some(42));
        assert_eq!(expr("-7").solve(), Some(-7));
        assert_eq!(expr("10 - 3").solve(), Some(7));
        assert_eq!(expr("0x10 + 1").solve(), Some(17));
        assert_eq!(expr("IDC_X").solve(), None);
        assert_eq!(expr("1 -").solve(), None);
    }

    #[test]
    fn test_solve_overflow_is_unsolvable() {
        assert_eq!(expr("9223372036854775807 + 1").solve(), None);
        assert_eq!(expr("9223372036854775807").solve(), Some(i64::MAX));
        assert_eq!(expr("0 - 9223372036854775807 - 2").solve(), None);
    }
}
