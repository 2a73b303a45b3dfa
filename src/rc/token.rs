//! Token kinds and the keyword table

use serde::Serialize;
use std::fmt;

use crate::rc::position::{Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Comma,
    LBrace,
    RBrace,
    LParen,
    RParen,

    Plus,
    Minus,
    Asterisk,
    Slash,
    Pipe,
    Ampersand,
    Tilde,

    HexInt,
    Integer,
    Double,
    String,

    Ident,

    // keywords
    Begin,
    KwEnd,
    Language,
    Menu,
    MenuEx,
    Popup,
    MenuItem,
    Separator,
    Dialog,
    DialogEx,
    Style,
    ExStyle,
    Caption,
    Font,
    Control,
    EditText,
    DefPushButton,
    PushButton,
    LText,
    RText,
    CText,
    GroupBox,
    ListBox,
    CheckBox,
    RadioButton,
    AutoRadioButton,
    AutoCheckBox,
    Icon,
    ComboBox,
    StringTable,
    Discardable,
    And,
    Or,
    Not,

    /// End of input
    End,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("BEGIN", TokenKind::Begin),
    ("END", TokenKind::KwEnd),
    ("LANGUAGE", TokenKind::Language),
    ("MENU", TokenKind::Menu),
    ("MENUEX", TokenKind::MenuEx),
    ("POPUP", TokenKind::Popup),
    ("MENUITEM", TokenKind::MenuItem),
    ("SEPARATOR", TokenKind::Separator),
    ("DIALOG", TokenKind::Dialog),
    ("DIALOGEX", TokenKind::DialogEx),
    ("STYLE", TokenKind::Style),
    ("EXSTYLE", TokenKind::ExStyle),
    ("CAPTION", TokenKind::Caption),
    ("FONT", TokenKind::Font),
    ("CONTROL", TokenKind::Control),
    ("EDITTEXT", TokenKind::EditText),
    ("DEFPUSHBUTTON", TokenKind::DefPushButton),
    ("PUSHBUTTON", TokenKind::PushButton),
    ("LTEXT", TokenKind::LText),
    ("RTEXT", TokenKind::RText),
    ("CTEXT", TokenKind::CText),
    ("GROUPBOX", TokenKind::GroupBox),
    ("LISTBOX", TokenKind::ListBox),
    ("CHECKBOX", TokenKind::CheckBox),
    ("RADIOBUTTON", TokenKind::RadioButton),
    ("AUTORADIOBUTTON", TokenKind::AutoRadioButton),
    ("AUTOCHECKBOX", TokenKind::AutoCheckBox),
    ("ICON", TokenKind::Icon),
    ("COMBOBOX", TokenKind::ComboBox),
    ("STRINGTABLE", TokenKind::StringTable),
    ("DISCARDABLE", TokenKind::Discardable),
    ("AND", TokenKind::And),
    ("OR", TokenKind::Or),
    ("NOT", TokenKind::Not),
];

impl TokenKind {
    /// Case-insensitive keyword lookup
    pub fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(word))
            .map(|(_, kind)| *kind)
    }

    /// `{` and `BEGIN` open a scope
    pub fn is_open(self) -> bool {
        matches!(self, TokenKind::LBrace | TokenKind::Begin)
    }

    /// `}` and `END` close a scope
    pub fn is_close(self) -> bool {
        matches!(self, TokenKind::RBrace | TokenKind::KwEnd)
    }

    pub fn is_value(self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::HexInt
                | TokenKind::Double
                | TokenKind::String
                | TokenKind::Ident
        )
    }

    pub fn is_number_or_ident(self) -> bool {
        self.is_value() && self != TokenKind::String
    }

    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Asterisk
                | TokenKind::Slash
                | TokenKind::Pipe
                | TokenKind::Ampersand
                | TokenKind::And
                | TokenKind::Or
        )
    }

    pub fn is_unary_operator(self) -> bool {
        matches!(self, TokenKind::Minus | TokenKind::Tilde | TokenKind::Not)
    }

    /// Keywords that start a control line inside a dialog body
    pub fn is_control_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Control
                | TokenKind::PushButton
                | TokenKind::DefPushButton
                | TokenKind::GroupBox
                | TokenKind::LText
                | TokenKind::RText
                | TokenKind::CText
                | TokenKind::CheckBox
                | TokenKind::AutoCheckBox
                | TokenKind::RadioButton
                | TokenKind::AutoRadioButton
                | TokenKind::Icon
                | TokenKind::ListBox
                | TokenKind::EditText
                | TokenKind::ComboBox
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Comma => "','",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Pipe => "'|'",
            TokenKind::Ampersand => "'&'",
            TokenKind::Tilde => "'~'",
            TokenKind::HexInt => "hex integer",
            TokenKind::Integer => "integer",
            TokenKind::Double => "number",
            TokenKind::String => "string",
            TokenKind::Ident => "identifier",
            TokenKind::End => "end of input",
            keyword => {
                return match KEYWORDS.iter().find(|(_, kind)| kind == keyword) {
                    Some((name, _)) => write!(f, "{}", name),
                    None => write!(f, "{:?}", keyword),
                };
            }
        };
        write!(f, "{}", text)
    }
}

/// One lexeme with its raw source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.chars().count() > 22 {
            let head: String = self.text.chars().take(20).collect();
            write!(f, "({} @ {}: {}...)", self.kind, self.start, head)
        } else {
            write!(f, "({} @ {}: {})", self.kind, self.start, self.text)
        }
    }
}
