//! Character stream with bounded lookahead and line/column tracking

use std::collections::VecDeque;
use std::str::Chars;

use crate::rc::error::ParseError;
use crate::rc::position::Position;

pub struct Reader<'a> {
    chars: Chars<'a>,
    /// Characters pulled from `chars` but not consumed yet
    lookahead: VecDeque<char>,
    offset: usize,
    line: usize,
    column: usize,
    /// Set after consuming `\r`; a directly following `\n` belongs to the same break
    pending_cr: bool,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Reader {
            chars: source.chars(),
            lookahead: VecDeque::with_capacity(8),
            offset: 0,
            line: 1,
            column: 1,
            pending_cr: false,
        }
    }

    /// Make sure at least `count` characters are buffered, or as many as remain
    fn fill(&mut self, count: usize) {
        while self.lookahead.len() < count {
            match self.chars.next() {
                Some(ch) => self.lookahead.push_back(ch),
                None => break,
            }
        }
    }

    /// Look at the character `offset` places ahead. `None` means end of input.
    pub fn peek(&mut self, offset: usize) -> Option<char> {
        self.fill(offset + 1);
        self.lookahead.get(offset).copied()
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    fn next(&mut self) -> Result<char, ParseError> {
        self.fill(1);
        let ch = self
            .lookahead
            .pop_front()
            .ok_or(ParseError::UnexpectedEndOfInput { at: self.position() })?;

        self.offset += ch.len_utf8();
        match ch {
            '\n' if self.pending_cr => {
                // second half of \r\n, the line was already counted
                self.pending_cr = false;
            }
            '\n' | '\r' => {
                self.line += 1;
                self.column = 1;
                self.pending_cr = ch == '\r';
            }
            _ => {
                self.column += 1;
                self.pending_cr = false;
            }
        }

        Ok(ch)
    }

    /// Consume `count` characters and return them
    pub fn read(&mut self, count: usize) -> Result<String, ParseError> {
        let mut text = String::with_capacity(count);
        for _ in 0..count {
            text.push(self.next()?);
        }
        Ok(text)
    }

    pub fn skip(&mut self, count: usize) -> Result<(), ParseError> {
        for _ in 0..count {
            self.next()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_past_end_is_sentinel() {
        let mut reader = Reader::new("ab");
        assert_eq!(reader.peek(0), Some('a'));
        assert_eq!(reader.peek(1), Some('b'));
        assert_eq!(reader.peek(2), None);
        assert_eq!(reader.peek(10), None);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut reader = Reader::new("ab");
        assert_eq!(reader.read(2).unwrap(), "ab");
        assert!(matches!(
            reader.read(1),
            Err(ParseError::UnexpectedEndOfInput { .. })
        ));
        assert!(reader.skip(1).is_err());
    }

    #[test]
    fn test_line_breaks_counted_once() {
        let mut reader = Reader::new("a\r\nb\rc\nd");
        reader.skip(3).unwrap();
        assert_eq!(reader.position().line, 2);
        assert_eq!(reader.position().column, 1);
        reader.skip(2).unwrap();
        assert_eq!(reader.position().line, 3);
        reader.skip(2).unwrap();
        let pos = reader.position();
        assert_eq!((pos.line, pos.column), (4, 1));
        assert_eq!(reader.read(1).unwrap(), "d");
        assert_eq!(reader.position().column, 2);
    }

    #[test]
    fn test_offset_counts_bytes() {
        let mut reader = Reader::new("é\"x");
        reader.skip(1).unwrap();
        assert_eq!(reader.position().offset, 2);
        assert_eq!(reader.position().column, 2);
    }
}
