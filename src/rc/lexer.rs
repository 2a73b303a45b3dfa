//! Tokenizer for resource scripts
//!
//! Comments, preprocessor lines and whitespace are dropped here. Everything
//! the parser looks at goes through a small token lookahead queue so grammar
//! decisions can inspect a couple of tokens without consuming them.

use std::collections::VecDeque;

use crate::rc::error::ParseError;
use crate::rc::position::Position;
use crate::rc::reader::Reader;
use crate::rc::token::{Token, TokenKind};

pub struct Lexer<'a> {
    reader: Reader<'a>,
    lookahead: VecDeque<Token>,
    seen_end: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            reader: Reader::new(source),
            lookahead: VecDeque::with_capacity(4),
            seen_end: false,
        }
    }

    fn fill(&mut self, count: usize) -> Result<(), ParseError> {
        while self.lookahead.len() < count {
            let token = self.lex_one()?;
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    /// Kind of the token `offset` places ahead
    pub fn peek(&mut self, offset: usize) -> Result<TokenKind, ParseError> {
        Ok(self.peek_token(offset)?.kind)
    }

    pub fn peek_token(&mut self, offset: usize) -> Result<&Token, ParseError> {
        self.fill(offset + 1)?;
        // fill either succeeded or returned early, so the slot exists
        Ok(&self.lookahead[offset])
    }

    pub fn pop(&mut self) -> Result<Token, ParseError> {
        self.fill(1)?;
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => Err(ParseError::UnexpectedEndOfInput {
                at: self.reader.position(),
            }),
        }
    }

    /// Position of the next unconsumed token
    pub fn position(&self) -> Position {
        match self.lookahead.front() {
            Some(token) => token.start,
            None => self.reader.position(),
        }
    }

    fn make(&mut self, kind: TokenKind, len: usize) -> Result<Token, ParseError> {
        let start = self.reader.position();
        let text = self.reader.read(len)?;
        Ok(Token {
            kind,
            text,
            start,
            end: self.reader.position(),
        })
    }

    fn end_token(&mut self) -> Token {
        self.seen_end = true;
        let at = self.reader.position();
        Token {
            kind: TokenKind::End,
            text: String::new(),
            start: at,
            end: at,
        }
    }

    fn skip_line(&mut self) -> Result<(), ParseError> {
        while let Some(ch) = self.reader.peek(0) {
            if ch == '\n' || ch == '\r' {
                break;
            }
            self.reader.skip(1)?;
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        // consume the opening "/*"
        self.reader.skip(2)?;
        loop {
            match (self.reader.peek(0), self.reader.peek(1)) {
                (Some('*'), Some('/')) => return self.reader.skip(2),
                (Some(_), _) => self.reader.skip(1)?,
                (None, _) => {
                    return Err(ParseError::UnexpectedEndOfInput {
                        at: self.reader.position(),
                    })
                }
            }
        }
    }

    /// Skip whitespace, comments and `#` directives
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.reader.peek(0) {
                Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => self.reader.skip(1)?,
                Some('#') => self.skip_line()?,
                Some('/') => match self.reader.peek(1) {
                    Some('/') => self.skip_line()?,
                    Some('*') => self.skip_block_comment()?,
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn lex_one(&mut self) -> Result<Token, ParseError> {
        if self.seen_end {
            return Ok(self.end_token());
        }

        self.skip_trivia()?;

        let ch = match self.reader.peek(0) {
            Some(ch) => ch,
            None => return Ok(self.end_token()),
        };

        let punct = match ch {
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Asterisk),
            '/' => Some(TokenKind::Slash),
            '|' => Some(TokenKind::Pipe),
            '&' => Some(TokenKind::Ampersand),
            '~' => Some(TokenKind::Tilde),
            _ => None,
        };
        if let Some(kind) = punct {
            return self.make(kind, 1);
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            return self.lex_identifier();
        }

        if ch == '"' || ch == '\'' {
            return self.lex_string(ch);
        }

        if ch.is_ascii_digit() || ch == '.' {
            return self.lex_number();
        }

        Err(ParseError::UnexpectedCharacter {
            at: self.reader.position(),
            found: ch,
        })
    }

    fn lex_identifier(&mut self) -> Result<Token, ParseError> {
        let mut len = 1;
        while let Some(ch) = self.reader.peek(len) {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                len += 1;
            } else {
                break;
            }
        }

        let mut token = self.make(TokenKind::Ident, len)?;
        if let Some(keyword) = TokenKind::keyword(&token.text) {
            token.kind = keyword;
        }
        Ok(token)
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, ParseError> {
        let at = self.reader.position();
        let mut len = 1;
        loop {
            match self.reader.peek(len) {
                Some(ch) if ch == quote => {
                    if self.reader.peek(len + 1) == Some(quote) {
                        // doubled delimiter stands for one literal quote
                        len += 2;
                    } else {
                        len += 1;
                        break;
                    }
                }
                Some('\\') => len = self.escape_len(len, at)?,
                Some('\r') | Some('\n') | None => {
                    return Err(ParseError::UnterminatedStringLiteral { at })
                }
                Some(_) => len += 1,
            }
        }
        self.make(TokenKind::String, len)
    }

    /// Length of the string prefix once the escape starting at `len` is consumed
    fn escape_len(&mut self, len: usize, at: Position) -> Result<usize, ParseError> {
        let after = len + 1;
        match self.reader.peek(after) {
            None => Err(ParseError::UnterminatedStringLiteral { at }),
            // backslash-newline continues the literal on the next line
            Some('\r') if self.reader.peek(after + 1) == Some('\n') => Ok(after + 2),
            Some('x') => Ok(self.hex_digits_len(after + 1, 2)),
            Some('u') => Ok(self.hex_digits_len(after + 1, 4)),
            Some(_) => Ok(after + 1),
        }
    }

    fn hex_digits_len(&mut self, mut len: usize, max: usize) -> usize {
        for _ in 0..max {
            match self.reader.peek(len) {
                Some(ch) if ch.is_ascii_hexdigit() => len += 1,
                _ => break,
            }
        }
        len
    }

    fn digits_len(&mut self, mut len: usize) -> usize {
        while matches!(self.reader.peek(len), Some(ch) if ch.is_ascii_digit()) {
            len += 1;
        }
        len
    }

    fn require_digit(&mut self, len: usize) -> Result<(), ParseError> {
        match self.reader.peek(len) {
            Some(ch) if ch.is_ascii_digit() => Ok(()),
            other => Err(ParseError::MalformedNumericLiteral {
                at: self.reader.position(),
                found: other.map_or_else(|| "end of input".to_string(), |c| format!("{:?}", c)),
            }),
        }
    }

    fn lex_number(&mut self) -> Result<Token, ParseError> {
        if self.reader.peek(0) == Some('0') && matches!(self.reader.peek(1), Some('x') | Some('X')) {
            let mut len = 2;
            while matches!(self.reader.peek(len), Some(ch) if ch.is_ascii_hexdigit()) {
                len += 1;
            }
            return self.make(TokenKind::HexInt, len);
        }

        let mut len = self.digits_len(0);
        let mut fractional = false;

        if self.reader.peek(len) == Some('.') {
            fractional = true;
            len += 1;
            self.require_digit(len)?;
            len = self.digits_len(len);
        }

        if matches!(self.reader.peek(len), Some('e') | Some('E')) {
            fractional = true;
            len += 1;
            if matches!(self.reader.peek(len), Some('+') | Some('-')) {
                len += 1;
            }
            self.require_digit(len)?;
            len = self.digits_len(len);
        }

        let kind = if fractional {
            TokenKind::Double
        } else {
            TokenKind::Integer
        };
        self.make(kind, len)
    }
}

/// Lex a whole source into tokens, excluding the final `End`
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.pop()?;
        if token.kind == TokenKind::End {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}

pub fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Decoded display text of a string token; other tokens are returned verbatim
pub fn unescape_string(token: &Token) -> String {
    if token.kind == TokenKind::String {
        unescape_literal(&token.text)
    } else {
        token.text.clone()
    }
}

/// Decode a quoted literal, including its delimiters, into plain text
pub fn unescape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    let quote = match chars.next() {
        Some(q @ ('"' | '\'')) => q,
        Some(other) => {
            out.push(other);
            out.extend(chars);
            return out;
        }
        None => return out,
    };

    while let Some(ch) = chars.next() {
        if ch == quote {
            if chars.peek() == Some(&quote) {
                chars.next();
                out.push(quote);
                continue;
            }
            break;
        }

        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            // backslash-newline is a line continuation
            Some('\n') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(esc @ ('x' | 'u')) => {
                let max = if esc == 'x' { 2 } else { 4 };
                let mut value = 0u32;
                let mut digits = 0;
                while digits < max {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            value = value * 16 + d;
                            digits += 1;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    out.push(esc);
                } else {
                    out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            // \" \' \\ and anything unknown stand for the character itself
            Some(other) => out.push(other),
            None => break,
        }
    }

    out
}

fn is_printable(c: char) -> bool {
    !c.is_control() && (c == ' ' || c.is_ascii_graphic() || c.is_whitespace() || c.is_alphanumeric())
}

/// Quote and escape `text` so that lexing and unescaping it gives `text` back
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if is_printable(c) || (c as u32) > 0xFFFF => out.push(c),
            c => out.push_str(&format!("\\u{:04X}", c as u32)),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_skips_comments_and_directives() {
        let source = "#include \"resource.h\"\n// line comment\n/* block\n comment */ BEGIN END";
        assert_eq!(kinds(source), vec![TokenKind::Begin, TokenKind::KwEnd]);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("IDD_ABOUT DialogEx 0, 0, 10, 10"),
            vec![
                TokenKind::Ident,
                TokenKind::DialogEx,
                TokenKind::Integer,
                TokenKind::Comma,
                TokenKind::Integer,
                TokenKind::Comma,
                TokenKind::Integer,
                TokenKind::Comma,
                TokenKind::Integer,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("0x1F 42 3.25 1e10 2.5E-3 .5").unwrap();
        let got: Vec<(TokenKind, &str)> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (TokenKind::HexInt, "0x1F"),
                (TokenKind::Integer, "42"),
                (TokenKind::Double, "3.25"),
                (TokenKind::Double, "1e10"),
                (TokenKind::Double, "2.5E-3"),
                (TokenKind::Double, ".5"),
            ]
        );
    }

    #[test]
    fn test_malformed_numbers() {
        assert!(matches!(
            tokenize("1.x"),
            Err(ParseError::MalformedNumericLiteral { .. })
        ));
        assert!(matches!(
            tokenize("1e+"),
            Err(ParseError::MalformedNumericLiteral { .. })
        ));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("MENUITEM \"Broken\nMENUITEM").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedStringLiteral { .. }));
        assert_eq!(err.position().line, 1);
        assert_eq!(err.position().column, 10);
    }

    #[test]
    fn test_unexpected_character() {
        assert!(matches!(
            tokenize("IDS_X = 1"),
            Err(ParseError::UnexpectedCharacter { found: '=', .. })
        ));
    }

    #[test]
    fn test_string_token_spans() {
        let tokens = tokenize("  \"a\\\"b\" x").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "\"a\\\"b\"");
        assert_eq!(tokens[0].start.column, 3);
        assert_eq!(tokens[0].end.column, 9);
        assert_eq!(tokens[1].start.offset, 9);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_literal("\"Tab\\there\""), "Tab\there");
        assert_eq!(unescape_literal("\"Say \"\"hi\"\"\""), "Say \"hi\"");
        assert_eq!(unescape_literal("\"\\x41\\u00e9\\x4\""), "Aé\u{4}");
        assert_eq!(unescape_literal("'it''s'"), "it's");
        assert_eq!(unescape_literal("\"a\\\\b\""), "a\\b");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_string("a\"b\n"), "\"a\\\"b\\n\"");
        assert_eq!(escape_string("\u{1}"), "\"\\u0001\"");
        assert_eq!(escape_string("Größe"), "\"Größe\"");
    }

    #[test]
    fn test_escape_round_trip_through_lexer() {
        for text in ["plain", "quote\" and \\ backslash", "\u{0}\u{7f}\u{2028}€", "tab\tcr\rnl\n"] {
            let escaped = escape_string(text);
            let tokens = tokenize(&escaped).unwrap();
            assert_eq!(tokens.len(), 1, "{:?}", escaped);
            assert_eq!(unescape_string(&tokens[0]), text);
        }
    }

    #[test]
    fn test_end_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.pop().unwrap().kind, TokenKind::Ident);
        assert_eq!(lexer.pop().unwrap().kind, TokenKind::End);
        assert_eq!(lexer.pop().unwrap().kind, TokenKind::End);
        assert_eq!(lexer.peek(3).unwrap(), TokenKind::End);
    }

    #[test]
    fn test_valid_identifier() {
        assert!(is_valid_identifier("IDS_OK"));
        assert!(is_valid_identifier("_x1"));
        assert!(!is_valid_identifier("1x"));
        assert!(!is_valid_identifier(""));
    }
}
