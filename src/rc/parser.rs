//! Recursive-descent parser for resource scripts
//!
//! Only menus, dialogs, string tables and `LANGUAGE` statements are modelled.
//! Anything else at top level is skipped one token at a time, so a resource
//! type we do not understand never costs us the rest of the file.

use crate::rc::ast::{
    Dimensions, DialogControl, DialogDefinition, Expression, Font, LanguageStatement,
    MenuDefinition, MenuItem, ParseErrorRecovery, ResourceScript, ResourceStatement,
    StringTable, StringTableEntry,
};
use crate::rc::classes;
use crate::rc::error::{Diagnostic, DiagnosticKind, ParseError};
use crate::rc::lexer::{unescape_string, Lexer};
use crate::rc::token::{Token, TokenKind};

/// What the innermost open `{`/`BEGIN` belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Root,
    Menu,
    Dialog,
    StringTable,
    /// Block of a statement we skip
    Unhandled,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    state: ScopeState,
    stack: Vec<ScopeState>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            state: ScopeState::Root,
            stack: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<ResourceScript, ParseError> {
        let mut statements = Vec::new();

        while self.lexer.peek(0)? != TokenKind::End {
            let statement = if self.state == ScopeState::Unhandled {
                self.recover()?
            } else {
                self.element()?
            };
            statements.push(statement);
        }
        self.pop_expected(&[TokenKind::End])?;

        Ok(ResourceScript {
            statements,
            diagnostics: self.diagnostics,
            unclosed_scopes: self.stack.len(),
        })
    }

    // --- token helpers ---

    fn pop_expected(&mut self, expected: &[TokenKind]) -> Result<Token, ParseError> {
        let current = self.lexer.peek(0)?;
        if expected.contains(&current) {
            return self.lexer.pop();
        }
        Err(ParseError::UnexpectedToken {
            at: self.lexer.position(),
            got: current,
            expected: expected.to_vec(),
        })
    }

    /// Pop the next token if it has the given kind
    fn accept(&mut self, kind: TokenKind) -> Result<Option<Token>, ParseError> {
        if self.lexer.peek(0)? == kind {
            Ok(Some(self.lexer.pop()?))
        } else {
            Ok(None)
        }
    }

    fn open_scope(&mut self, next: ScopeState) -> Result<(), ParseError> {
        self.pop_expected(&[TokenKind::LBrace, TokenKind::Begin])?;
        self.push_scope(next);
        Ok(())
    }

    fn close_scope(&mut self) -> Result<(), ParseError> {
        let token = self.pop_expected(&[TokenKind::RBrace, TokenKind::KwEnd])?;
        self.pop_scope(&token);
        Ok(())
    }

    fn push_scope(&mut self, next: ScopeState) {
        self.stack.push(self.state);
        self.state = next;
    }

    fn pop_scope(&mut self, token: &Token) {
        match self.stack.pop() {
            Some(previous) => self.state = previous,
            None => {
                tracing::debug!(line = token.start.line, "unbalanced {}", token.text);
                self.diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::UnbalancedScopeClose,
                    at: token.start,
                    token: token.text.clone(),
                });
            }
        }
    }

    fn at_close(&mut self) -> Result<bool, ParseError> {
        Ok(self.lexer.peek(0)?.is_close())
    }

    // --- statements ---

    fn element(&mut self) -> Result<ResourceStatement, ParseError> {
        match self.lexer.peek(0)? {
            TokenKind::Language => {
                return Ok(ResourceStatement::Language(self.language_statement()?));
            }
            TokenKind::StringTable => {
                return Ok(ResourceStatement::StringTable(self.string_table()?));
            }
            _ => {}
        }

        if self.is_value_start(0, true)? {
            let first = self.lexer.peek_token(0)?.clone();
            let ident = self.expression(true)?;
            match self.lexer.peek(0)? {
                TokenKind::Menu | TokenKind::MenuEx => {
                    return Ok(ResourceStatement::Menu(self.menu_statement(ident)?));
                }
                TokenKind::Dialog | TokenKind::DialogEx => {
                    return Ok(ResourceStatement::Dialog(self.dialog_statement(ident)?));
                }
                _ => {}
            }
            // a resource type we do not model; keep going after the name
            return Ok(self.skipped_expression(first));
        }

        self.recover()
    }

    fn skipped_expression(&mut self, skipped: Token) -> ResourceStatement {
        if self.state == ScopeState::Root {
            tracing::trace!(token = %skipped, "skipping unmodelled resource");
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::UnrecognizedTopLevelStatement,
                at: skipped.start,
                token: skipped.text.clone(),
            });
        }
        ResourceStatement::Recovery(ParseErrorRecovery {
            position: skipped.start,
            skipped,
        })
    }

    /// Skip one token, keeping braces balanced
    fn recover(&mut self) -> Result<ResourceStatement, ParseError> {
        let skipped = self.lexer.pop()?;

        if skipped.kind.is_open() {
            self.push_scope(ScopeState::Unhandled);
        } else if skipped.kind.is_close() {
            self.pop_scope(&skipped);
        } else if self.state == ScopeState::Root {
            tracing::trace!(token = %skipped, "skipping top-level token");
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::UnrecognizedTopLevelStatement,
                at: skipped.start,
                token: skipped.text.clone(),
            });
        }

        Ok(ResourceStatement::Recovery(ParseErrorRecovery {
            position: skipped.start,
            skipped,
        }))
    }

    fn language_statement(&mut self) -> Result<LanguageStatement, ParseError> {
        let keyword = self.pop_expected(&[TokenKind::Language])?;
        let names = [TokenKind::Ident, TokenKind::Integer, TokenKind::HexInt];
        let lang = self.pop_expected(&names)?;
        let sublang = if self.accept(TokenKind::Comma)?.is_some() {
            Some(self.pop_expected(&names)?)
        } else {
            None
        };

        Ok(LanguageStatement {
            position: keyword.start,
            lang,
            sublang,
        })
    }

    fn menu_statement(&mut self, identifier: Expression) -> Result<MenuDefinition, ParseError> {
        let keyword = self.pop_expected(&[TokenKind::Menu, TokenKind::MenuEx])?;
        // DISCARDABLE and the legacy memory flags (MOVEABLE, PURE...)
        while matches!(self.lexer.peek(0)?, TokenKind::Discardable | TokenKind::Ident) {
            self.lexer.pop()?;
        }

        self.open_scope(ScopeState::Menu)?;
        let mut items = Vec::new();
        while !self.at_close()? {
            items.push(self.menu_item()?);
        }
        self.close_scope()?;

        Ok(MenuDefinition {
            position: keyword.start,
            identifier,
            keyword,
            items,
        })
    }

    fn menu_item(&mut self) -> Result<MenuItem, ParseError> {
        let entry_type = self.pop_expected(&[TokenKind::MenuItem, TokenKind::Popup])?;

        if self.accept(TokenKind::Separator)?.is_some() {
            return Ok(MenuItem {
                position: entry_type.start,
                entry_type,
                identifier: None,
                text: None,
                separator: true,
                children: Vec::new(),
            });
        }

        let text = self.pop_expected(&[TokenKind::String])?;
        self.accept(TokenKind::Comma)?;

        let mut identifier = None;
        if self.is_expression_start(0, false)? {
            identifier = Some(self.expression(false)?);
            self.accept(TokenKind::Comma)?;
            // type/state/help id flags, not needed here
            self.skip_expressions()?;
        }

        let mut children = Vec::new();
        if entry_type.kind == TokenKind::Popup {
            self.open_scope(ScopeState::Menu)?;
            while !self.at_close()? {
                children.push(self.menu_item()?);
            }
            self.close_scope()?;
        }

        Ok(MenuItem {
            position: entry_type.start,
            entry_type,
            identifier,
            text: Some(text),
            separator: false,
            children,
        })
    }

    fn dialog_statement(&mut self, identifier: Expression) -> Result<DialogDefinition, ParseError> {
        let entry_type = self.pop_expected(&[TokenKind::Dialog, TokenKind::DialogEx])?;
        self.accept(TokenKind::Discardable)?;

        let mut dialog = DialogDefinition {
            position: entry_type.start,
            entry_type,
            identifier,
            caption: None,
            font: None,
            style: None,
            ex_style: None,
            dimensions: Dimensions::default(),
            controls: Vec::new(),
        };

        dialog.dimensions = self.dimensions(4)?;
        // DIALOGEX help id
        self.skip_expressions()?;

        loop {
            match self.lexer.peek(0)? {
                TokenKind::LBrace | TokenKind::Begin => break,
                TokenKind::Style => {
                    self.lexer.pop()?;
                    dialog.style = Some(self.style_expression()?);
                }
                TokenKind::ExStyle => {
                    self.lexer.pop()?;
                    dialog.ex_style = Some(self.style_expression()?);
                }
                TokenKind::Font => {
                    self.lexer.pop()?;
                    let size = self.pop_expected(&[TokenKind::Double, TokenKind::Integer])?;
                    self.accept(TokenKind::Comma)?;
                    let name = self.pop_expected(&[TokenKind::String])?;
                    dialog.font = Some(Font {
                        size: size.text.parse().unwrap_or(0.0),
                        name: unescape_string(&name),
                    });
                }
                TokenKind::Caption => {
                    self.lexer.pop()?;
                    dialog.caption = Some(self.pop_expected(&[TokenKind::String])?);
                }
                TokenKind::Menu => {
                    self.lexer.pop()?;
                    self.expression(true)?;
                }
                TokenKind::Language => {
                    self.language_statement()?;
                }
                // CLASS, CHARACTERISTICS, VERSION: arguments are skipped below
                TokenKind::Ident => {
                    self.lexer.pop()?;
                }
                got => {
                    return Err(ParseError::UnexpectedToken {
                        at: self.lexer.position(),
                        got,
                        expected: vec![
                            TokenKind::Style,
                            TokenKind::ExStyle,
                            TokenKind::Font,
                            TokenKind::Caption,
                            TokenKind::Menu,
                            TokenKind::LBrace,
                            TokenKind::Begin,
                        ],
                    });
                }
            }
            self.accept(TokenKind::Comma)?;
            self.skip_expressions()?;
        }

        self.open_scope(ScopeState::Dialog)?;
        while !self.at_close()? {
            let control = self.dialog_control()?;
            dialog.controls.push(control);
        }
        self.close_scope()?;

        Ok(dialog)
    }

    fn dialog_control(&mut self) -> Result<DialogControl, ParseError> {
        let kind = self.lexer.peek(0)?;
        if !kind.is_control_keyword() {
            return Err(ParseError::UnexpectedToken {
                at: self.lexer.position(),
                got: kind,
                expected: vec![
                    TokenKind::Control,
                    TokenKind::LText,
                    TokenKind::PushButton,
                    TokenKind::EditText,
                    TokenKind::RBrace,
                    TokenKind::KwEnd,
                ],
            });
        }

        let entry_type = self.lexer.pop()?;
        let mut text = None;
        let mut style = None;
        let mut control_class = classes::default_class(kind).to_string();

        let identifier = match kind {
            TokenKind::Icon | TokenKind::ListBox | TokenKind::EditText | TokenKind::ComboBox => {
                let mut identifier = self.expression(true)?;
                self.accept(TokenKind::Comma)?;
                if kind == TokenKind::Icon {
                    // ICON names the icon resource first, the control id second
                    text = identifier.tokens.first().cloned();
                    identifier = self.expression(true)?;
                    self.accept(TokenKind::Comma)?;
                }
                identifier
            }
            _ => {
                if self.lexer.peek(0)? == TokenKind::String {
                    text = Some(self.lexer.pop()?);
                } else {
                    // label given as a string resource id
                    self.expression(true)?;
                }
                self.accept(TokenKind::Comma)?;
                let identifier = self.expression(true)?;
                self.accept(TokenKind::Comma)?;

                if kind == TokenKind::Control {
                    let class = self.pop_expected(&[TokenKind::String, TokenKind::Ident])?;
                    control_class = if class.kind == TokenKind::String {
                        unescape_string(&class)
                    } else {
                        classes::translate(&class.text)
                    };
                    self.pop_expected(&[TokenKind::Comma])?;
                    style = Some(self.style_expression()?);
                    self.pop_expected(&[TokenKind::Comma])?;
                }
                identifier
            }
        };

        // ICON may omit its width and height
        let required = if kind == TokenKind::Icon { 2 } else { 4 };
        let dimensions = self.dimensions(required)?;
        if style.is_none() && self.is_expression_start(0, true)? {
            style = Some(self.style_expression()?);
            self.accept(TokenKind::Comma)?;
        }
        // extended style, help id
        self.skip_expressions()?;

        Ok(DialogControl {
            position: entry_type.start,
            entry_type,
            identifier,
            text,
            dimensions,
            style,
            control_class,
        })
    }

    fn string_table(&mut self) -> Result<StringTable, ParseError> {
        let keyword = self.pop_expected(&[TokenKind::StringTable])?;
        self.accept(TokenKind::Discardable)?;

        self.open_scope(ScopeState::StringTable)?;
        let mut entries = Vec::new();
        while !self.at_close()? {
            let identifier = self.expression(false)?;
            self.accept(TokenKind::Comma)?;
            let text = self.pop_expected(&[TokenKind::String])?;
            entries.push(StringTableEntry {
                position: identifier.start(),
                identifier,
                text,
            });
        }
        self.close_scope()?;

        Ok(StringTable {
            position: keyword.start,
            entries,
        })
    }

    /// `x, y, cx, cy`, each solved to an integer
    fn dimensions(&mut self, required: usize) -> Result<Dimensions, ParseError> {
        let mut values = [0i64; 4];
        for (i, value) in values.iter_mut().enumerate() {
            if !self.is_expression_start(0, true)? {
                if i >= required {
                    break;
                }
                return Err(ParseError::UnexpectedToken {
                    at: self.lexer.position(),
                    got: self.lexer.peek(0)?,
                    expected: vec![TokenKind::Integer],
                });
            }
            let expr = self.expression(true)?;
            *value = expr.solve().unwrap_or_else(|| {
                tracing::debug!(line = expr.start().line, expr = %expr.process(), "unsolvable dimension");
                0
            });
            self.accept(TokenKind::Comma)?;
        }

        Ok(Dimensions {
            x: values[0],
            y: values[1],
            cx: values[2],
            cy: values[3],
        })
    }

    fn style_expression(&mut self) -> Result<Expression, ParseError> {
        self.expression(true)
    }

    fn skip_expressions(&mut self) -> Result<(), ParseError> {
        while self.is_expression_start(0, true)? {
            self.expression(true)?;
            self.accept(TokenKind::Comma)?;
        }
        Ok(())
    }

    // --- expressions ---

    fn is_value(kind: TokenKind, allow_strings: bool) -> bool {
        if allow_strings {
            kind.is_value()
        } else {
            kind.is_number_or_ident()
        }
    }

    fn is_expression_start(&mut self, offset: usize, allow_strings: bool) -> Result<bool, ParseError> {
        let kind = self.lexer.peek(offset)?;
        Ok(Self::is_value(kind, allow_strings)
            || kind.is_unary_operator()
            || kind == TokenKind::LParen)
    }

    /// Like `is_expression_start`, but a lone operator does not count
    fn is_value_start(&mut self, offset: usize, allow_strings: bool) -> Result<bool, ParseError> {
        let kind = self.lexer.peek(offset)?;
        if kind.is_unary_operator() {
            return self.is_expression_start(offset + 1, allow_strings);
        }
        Ok(Self::is_value(kind, allow_strings) || kind == TokenKind::LParen)
    }

    fn expression(&mut self, allow_strings: bool) -> Result<Expression, ParseError> {
        let mut tokens = Vec::new();
        self.expression_into(&mut tokens, allow_strings)?;
        Ok(Expression { tokens })
    }

    fn expression_into(&mut self, tokens: &mut Vec<Token>, allow_strings: bool) -> Result<(), ParseError> {
        loop {
            let kind = self.lexer.peek(0)?;
            if Self::is_value(kind, allow_strings) {
                tokens.push(self.lexer.pop()?);
            } else if kind.is_unary_operator() && self.is_expression_start(1, allow_strings)? {
                tokens.push(self.lexer.pop()?);
                continue;
            } else if kind == TokenKind::LParen {
                tokens.push(self.lexer.pop()?);
                self.expression_into(tokens, allow_strings)?;
                tokens.push(self.pop_expected(&[TokenKind::RParen])?);
            } else {
                let mut expected = vec![TokenKind::Integer, TokenKind::HexInt, TokenKind::Ident];
                if allow_strings {
                    expected.push(TokenKind::String);
                }
                expected.push(TokenKind::LParen);
                return Err(ParseError::UnexpectedToken {
                    at: self.lexer.position(),
                    got: kind,
                    expected,
                });
            }

            if !self.lexer.peek(0)?.is_binary_operator() {
                return Ok(());
            }
            tokens.push(self.lexer.pop()?);
        }
    }
}

/// Parse a whole resource script held in memory
pub fn parse_str(source: &str) -> Result<ResourceScript, ParseError> {
    Parser::new(source).parse()
}
