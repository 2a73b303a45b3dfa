//! Errors raised while reading, lexing and parsing a resource script

use crate::rc::position::Position;
use crate::rc::token::TokenKind;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Fatal errors: any of these aborts the current file, never the scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("[Line {}:{}] unexpected end of input", .at.line, .at.column)]
    UnexpectedEndOfInput { at: Position },

    #[error("[Line {}:{}] unterminated string literal", .at.line, .at.column)]
    UnterminatedStringLiteral { at: Position },

    #[error("[Line {}:{}] malformed numeric literal: expected digit, found {found}", .at.line, .at.column)]
    MalformedNumericLiteral { at: Position, found: String },

    #[error("[Line {}:{}] unexpected character {found:?}", .at.line, .at.column)]
    UnexpectedCharacter { at: Position, found: char },

    #[error("[Line {}:{}] unexpected token {got}, expected {}", .at.line, .at.column, ExpectedSet(.expected))]
    UnexpectedToken {
        at: Position,
        got: TokenKind,
        expected: Vec<TokenKind>,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedEndOfInput { at }
            | ParseError::UnterminatedStringLiteral { at }
            | ParseError::MalformedNumericLiteral { at, .. }
            | ParseError::UnexpectedCharacter { at, .. }
            | ParseError::UnexpectedToken { at, .. } => *at,
        }
    }

    pub fn is_lexical(&self) -> bool {
        !matches!(self, ParseError::UnexpectedToken { .. })
    }
}

struct ExpectedSet<'a>(&'a [TokenKind]);

impl fmt::Display for ExpectedSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [] => write!(f, "nothing"),
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "one of: ")?;
                for (i, kind) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", kind)?;
                }
                Ok(())
            }
        }
    }
}

/// Non-fatal events the parser recovers from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// `}` or `END` with no open scope
    UnbalancedScopeClose,
    /// A top-level token that starts no known statement; it was skipped
    UnrecognizedTopLevelStatement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub at: Position,
    pub token: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            DiagnosticKind::UnbalancedScopeClose => "unbalanced scope close",
            DiagnosticKind::UnrecognizedTopLevelStatement => "skipped unrecognized token",
        };
        write!(f, "[Line {}:{}] {} {:?}", self.at.line, self.at.column, what, self.token)
    }
}
