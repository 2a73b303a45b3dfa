//! Resource script front end: reader, lexer and parser

pub mod ast;
pub mod classes;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod reader;
pub mod token;

pub use ast::{ResourceScript, ResourceStatement, TranslationEntry};
pub use error::{Diagnostic, DiagnosticKind, ParseError};
pub use lexer::{escape_string, tokenize, unescape_literal, unescape_string, Lexer};
pub use parser::{parse_str, Parser};
pub use position::{Position, Span};
pub use token::{Token, TokenKind};
