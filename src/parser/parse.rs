//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the core parsing
//! infrastructure: the token lookahead queue, error reporting, source range
//! stamping and the top-level `parse` loop.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: class and function declarations
//! - `statements`: statements (if, loops, labels, flow control, ...)
//! - `expressions`: expressions, one function per precedence level
//!
//! # Lookahead
//!
//! Tokens are pulled from the [`Lexer`] only when needed. [`Parser::lookahead`]
//! scans until the queue holds `k + 1` tokens (pushing at the back) and
//! [`Parser::accept`] pops from the front, so any finite lookahead is
//! available without rescanning.
//!
//! # Errors
//!
//! Parsing never aborts. [`Parser::error`] reports the problem at the current
//! token, notifies listeners and discards that token so that every error
//! makes progress through the input.

use crate::parser::ast::*;
use crate::parser::lexer::Lexer;
use crate::parser::listener::{ListenerSet, ParseError, SharedListener};
use crate::parser::token::{Keyword, Token, TokenKind};
use std::collections::VecDeque;

/// Parser configuration
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// After a statement that reported errors, also skip to the next
    /// end of line, `;`, `}` or end of input.
    pub recover_to_statement_boundary: bool,
    /// Stop parsing, as if the input had ended, once this many errors
    /// have been reported.
    pub max_errors: Option<usize>,
}

/// Recursive descent parser for RPGCode
pub struct Parser<'src> {
    pub(crate) lexer: Lexer<'src>,
    pub(crate) pending: VecDeque<Token>,
    pub(crate) options: ParserOptions,
    listeners: ListenerSet,
    errors: Vec<ParseError>,
    last_end: SourceLocation,
    halted: bool,
    /// Expression nesting spent so far, see `parse_expression`.
    pub(crate) depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    pub fn with_options(source: &'src str, options: ParserOptions) -> Self {
        Self {
            lexer: Lexer::new(source),
            pending: VecDeque::new(),
            options,
            listeners: ListenerSet::default(),
            errors: Vec::new(),
            last_end: SourceLocation::new(0, 1, 1),
            halted: false,
            depth: 0,
        }
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&mut self, listener: SharedListener) -> bool {
        self.listeners.insert(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, listener: &SharedListener) -> bool {
        self.listeners.remove(listener)
    }

    /// Errors reported so far
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    pub fn source(&self) -> &'src str {
        self.lexer.source()
    }

    /// Parse the entire source into a compilation unit
    pub fn parse(&mut self) -> CompilationUnit {
        let mut unit = CompilationUnit::new();
        let start = self.begin_range();

        loop {
            self.skip_separators();
            let token = self.peek();

            if token.kind == TokenKind::End {
                break;
            }

            if token.is_keyword(Keyword::Class) {
                if let Some(class) = self.parse_class_declaration() {
                    unit.classes.push(class);
                }
            } else if self.at_function_declaration() {
                if let Some(function) = self.parse_function_declaration(Visibility::Public) {
                    unit.functions.push(function);
                }
            } else if self.starts_statement() {
                if let Some(statement) = self.parse_statement() {
                    unit.statements.push(statement);
                }
            } else {
                let found = self.describe(&token);
                self.error(format!("unexpected token in program body: {found}"));
            }
        }

        unit.range = self.end_range(start);
        log::trace!(
            "parsed {} classes, {} functions, {} statements with {} errors",
            unit.classes.len(),
            unit.functions.len(),
            unit.statements.len(),
            self.errors.len()
        );
        unit
    }

    // ===== Token queue =====

    /// The token `k` positions ahead of the current one.
    pub(crate) fn lookahead(&mut self, k: usize) -> Token {
        while self.pending.len() <= k {
            let token = if self.halted {
                self.end_token()
            } else {
                self.lexer.scan()
            };
            self.pending.push_back(token);
        }
        self.pending[k]
    }

    pub(crate) fn peek(&mut self) -> Token {
        self.lookahead(0)
    }

    /// Consume the current token.
    pub(crate) fn accept(&mut self) -> Token {
        let token = self.peek();
        self.pending.pop_front();
        if token.kind != TokenKind::End {
            self.last_end = token.end_location(self.lexer.source());
        }
        token
    }

    pub(crate) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn check_keyword(&mut self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.accept();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.accept();
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind`, or report "expected ..." and return `None`.
    pub(crate) fn expect(&mut self, kind: TokenKind, ctx: &str) -> Option<Token> {
        if self.check(kind) {
            return Some(self.accept());
        }
        let token = self.peek();
        let found = self.describe(&token);
        self.error(format!("expected {kind} {ctx}, found {found}"));
        None
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword, ctx: &str) -> Option<Token> {
        if self.check_keyword(keyword) {
            return Some(self.accept());
        }
        let token = self.peek();
        let found = self.describe(&token);
        self.error(format!("expected '{}' {ctx}, found {found}", keyword.as_str()));
        None
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Option<Identifier> {
        let token = self.expect(TokenKind::Identifier, ctx)?;
        Some(self.identifier(&token))
    }

    /// Build an identifier node from an already consumed token.
    pub(crate) fn identifier(&self, token: &Token) -> Identifier {
        let source = self.lexer.source();
        Identifier::new(
            token.lexeme(source),
            SourceRange::new(token.start_location(), token.end_location(source)),
        )
    }

    /// Skip end-of-line, `;` and comment tokens.
    pub(crate) fn skip_separators(&mut self) {
        while matches!(
            self.peek().kind,
            TokenKind::Eol | TokenKind::Semicolon | TokenKind::Comment
        ) {
            self.accept();
        }
    }

    /// Skip end-of-line and comment tokens (but not `;`).
    pub(crate) fn skip_blank_lines(&mut self) {
        while matches!(self.peek().kind, TokenKind::Eol | TokenKind::Comment) {
            self.accept();
        }
    }

    /// Index of the first token ahead that is not an end of line or comment.
    pub(crate) fn next_significant(&mut self) -> usize {
        let mut k = 0;
        while matches!(self.lookahead(k).kind, TokenKind::Eol | TokenKind::Comment) {
            k += 1;
        }
        k
    }

    // ===== Source ranges =====

    /// Start position of the next node: the start of the current token.
    pub(crate) fn begin_range(&mut self) -> SourceLocation {
        self.peek().start_location()
    }

    /// Range from `start` to the end of the last consumed token.
    pub(crate) fn end_range(&self, start: SourceLocation) -> SourceRange {
        if self.last_end.offset < start.offset {
            SourceRange::empty(start)
        } else {
            SourceRange::new(start, self.last_end)
        }
    }

    // ===== Errors =====

    pub(crate) fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Report `message` at the current token and discard that token.
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let token = self.peek();
        self.report(&token, message);
        if token.kind != TokenKind::End {
            self.accept();
        }
    }

    /// Report `message` at `token` without consuming anything.
    pub(crate) fn report(&mut self, token: &Token, message: impl Into<String>) {
        let error = ParseError::new(token.line, token.column, message);
        log::debug!("{error}");
        self.listeners.notify(&error);
        self.errors.push(error);

        if let Some(max) = self.options.max_errors {
            if !self.halted && self.errors.len() >= max {
                log::warn!("stopping after {max} parse errors");
                self.halted = true;
                self.pending.clear();
            }
        }
    }

    /// Skip to the next statement boundary. `}` and end of input are left
    /// for the enclosing block.
    pub(crate) fn synchronize(&mut self) {
        loop {
            match self.peek().kind {
                TokenKind::Eol | TokenKind::Semicolon => {
                    self.accept();
                    break;
                }
                TokenKind::BraceRight | TokenKind::End => break,
                _ => {
                    self.accept();
                }
            }
        }
    }

    /// Human readable description of a token for error messages.
    pub(crate) fn describe(&self, token: &Token) -> String {
        let lexeme = token.lexeme(self.lexer.source());
        match token.kind {
            TokenKind::Identifier => format!("identifier '{lexeme}'"),
            TokenKind::Keyword => format!("keyword '{}'", lexeme.to_ascii_lowercase()),
            TokenKind::Number => format!("number '{lexeme}'"),
            TokenKind::Unknown => format!("'{lexeme}'"),
            kind => kind.to_string(),
        }
    }

    fn end_token(&self) -> Token {
        let ctx = self.lexer.context();
        Token {
            kind: TokenKind::End,
            tag: None,
            offset: ctx.offset,
            length: 0,
            line: ctx.line,
            column: ctx.column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::listener::ErrorCollector;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_parse_simple_function() {
        let mut parser = Parser::new("function main() { return 0; }");
        let unit = parser.parse();

        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        assert_eq!(unit.functions.len(), 1);
        let main = &unit.functions[0];
        assert_eq!(main.name.name, "main");
        assert!(main.parameters.is_empty());
        let body = main.body.as_ref().expect("function body");
        assert_eq!(body.statements.len(), 1);
        match &body.statements[0] {
            Statement::Return {
                value: Some(Expression::Number { value, .. }),
                ..
            } => assert_eq!(*value, 0.0),
            other => panic!("Expected return of a number, got {:?}", other),
        }
    }

    #[test]
    fn test_lookahead_preserves_order() {
        let mut parser = Parser::new("a b c");
        assert_eq!(parser.lookahead(2).column, 5);
        assert_eq!(parser.lookahead(0).column, 1);
        assert_eq!(parser.accept().column, 1);
        assert_eq!(parser.accept().column, 3);
        assert_eq!(parser.peek().column, 5);
        assert_eq!(parser.lookahead(1).kind, TokenKind::End);
    }

    #[test]
    fn test_error_consumes_one_token() {
        let mut parser = Parser::new("@ x");
        parser.error("bad");
        assert_eq!(parser.errors().len(), 1);
        assert_eq!(parser.errors()[0].column, 1);
        assert_eq!(parser.peek().kind, TokenKind::Identifier);
    }

    #[test]
    fn test_listeners_receive_errors() {
        let collector = Rc::new(RefCell::new(ErrorCollector::new()));
        let mut parser = Parser::new("class Foo { @ }");
        assert!(parser.add_listener(collector.clone()));
        assert!(!parser.add_listener(collector.clone()));

        let unit = parser.parse();

        assert_eq!(unit.classes.len(), 1);
        assert_eq!(collector.borrow().errors().len(), 1);
        assert_eq!(collector.borrow().errors(), parser.errors());
    }

    #[test]
    fn test_max_errors_halts() {
        let options = ParserOptions {
            max_errors: Some(2),
            ..ParserOptions::default()
        };
        let mut parser = Parser::with_options(") ) ) ) )", options);
        parser.parse();
        assert_eq!(parser.errors().len(), 2);
    }

    #[test]
    fn test_unit_range_covers_source() {
        let source = "x = 1\ny = 2";
        let mut parser = Parser::new(source);
        let unit = parser.parse();
        assert_eq!(unit.range.start.offset, 0);
        assert_eq!(unit.range.end.offset, source.len());
        assert_eq!(unit.range.end.line, 2);
    }
}
