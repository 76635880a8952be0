//! Lexer (tokenizer) for RPGCode source
//!
//! The lexer is pull-based: every call to [`Lexer::scan`] produces exactly one
//! [`Token`] and advances the [`ScanContext`]. It never fails. Characters it
//! does not understand become [`TokenKind::Unknown`] tokens, and unterminated
//! strings or comments simply run to the end of the input; the parser's
//! expectation checks turn those into diagnostics later.
//!
//! Newlines are significant in RPGCode and are returned as
//! [`TokenKind::Eol`] tokens rather than skipped as whitespace.

use super::ast::SourceLocation;
use super::token::{Keyword, Token, TokenKind};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Longest keyword spelling, used to lowercase lexemes on the stack.
const MAX_KEYWORD_LEN: usize = 9;

static KEYWORDS: Lazy<FxHashMap<&'static str, Keyword>> = Lazy::new(|| {
    let mut table = FxHashMap::default();
    table.insert("class", Keyword::Class);
    table.insert("function", Keyword::Function);
    table.insert("method", Keyword::Function);
    table.insert("return", Keyword::Return);
    table.insert("public", Keyword::Public);
    table.insert("private", Keyword::Private);
    table.insert("protected", Keyword::Protected);
    table.insert("var", Keyword::Var);
    table.insert("do", Keyword::Do);
    table.insert("while", Keyword::While);
    table.insert("until", Keyword::Until);
    table.insert("loop", Keyword::Loop);
    table.insert("for", Keyword::For);
    table.insert("break", Keyword::Break);
    table.insert("continue", Keyword::Continue);
    table.insert("goto", Keyword::Goto);
    table.insert("if", Keyword::If);
    table.insert("else", Keyword::Else);
    table.insert("elseif", Keyword::ElseIf);
    table.insert("switch", Keyword::Switch);
    table.insert("case", Keyword::Case);
    table.insert("default", Keyword::Default);
    table.insert("null", Keyword::Null);
    table.insert("true", Keyword::True);
    table.insert("false", Keyword::False);
    table.insert("inline", Keyword::Inline);
    table.insert("and", Keyword::And);
    table.insert("or", Keyword::Or);
    table.insert("this", Keyword::This);
    table.insert("on", Keyword::On);
    table.insert("error", Keyword::Error);
    table.insert("resume", Keyword::Resume);
    table.insert("next", Keyword::Next);
    table
});

/// Case-insensitive keyword lookup.
pub fn lookup_keyword(lexeme: &str) -> Option<Keyword> {
    if lexeme.len() > MAX_KEYWORD_LEN || !lexeme.is_ascii() {
        return None;
    }
    let mut buf = [0u8; MAX_KEYWORD_LEN];
    let lowered = &mut buf[..lexeme.len()];
    lowered.copy_from_slice(lexeme.as_bytes());
    lowered.make_ascii_lowercase();
    std::str::from_utf8(lowered)
        .ok()
        .and_then(|key| KEYWORDS.get(key).copied())
}

/// Cursor state of a scan.
///
/// `current` is the byte at `offset`, or `0` once `offset == length`.
/// Lines and columns are 1-based; columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanContext {
    pub length: usize,
    pub current: u8,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ScanContext {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            current: 0,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.length
    }
}

/// Lexer for RPGCode source
pub struct Lexer<'src> {
    input: &'src str,
    bytes: &'src [u8],
    ctx: ScanContext,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer positioned at the start of `input`.
    pub fn new(input: &'src str) -> Self {
        Self::with_context(input, ScanContext::new(input.len()))
    }

    /// Create a lexer that resumes from a saved context.
    ///
    /// An offset inside a multi-byte character is moved back to the start
    /// of that character.
    pub fn with_context(input: &'src str, mut ctx: ScanContext) -> Self {
        ctx.length = input.len();
        ctx.offset = ctx.offset.min(ctx.length);
        while !input.is_char_boundary(ctx.offset) {
            ctx.offset -= 1;
        }
        ctx.current = input.as_bytes().get(ctx.offset).copied().unwrap_or(0);
        Self {
            input,
            bytes: input.as_bytes(),
            ctx,
        }
    }

    pub fn context(&self) -> &ScanContext {
        &self.ctx
    }

    pub fn source(&self) -> &'src str {
        self.input
    }

    /// Current scan position.
    pub fn location(&self) -> SourceLocation {
        SourceLocation::from(&self.ctx)
    }

    pub fn lexeme(&self, token: &Token) -> &'src str {
        token.lexeme(self.input)
    }

    /// Move the cursor to the next newline, or the end of input, without
    /// producing tokens.
    pub fn skip_line(&mut self) {
        while !self.ctx.is_at_end() && self.ctx.current != b'\n' {
            self.accept();
        }
    }

    /// Scan the whole input, `End` token included.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan();
            tokens.push(token);
            if token.kind == TokenKind::End {
                break;
            }
        }
        tokens
    }

    /// Produce the next token.
    pub fn scan(&mut self) -> Token {
        self.skip_whitespace();

        let mut token = Token {
            kind: TokenKind::Unknown,
            tag: None,
            offset: self.ctx.offset,
            length: 0,
            line: self.ctx.line,
            column: self.ctx.column,
        };

        if self.ctx.is_at_end() {
            token.kind = TokenKind::End;
            return token;
        }

        let kind = match self.ctx.current {
            b'\n' => self.single(TokenKind::Eol),
            b'$' => self.single(TokenKind::Dollar),
            b';' => self.single(TokenKind::Semicolon),
            b',' => self.single(TokenKind::Comma),
            b':' => self.single(TokenKind::Colon),
            b'(' => self.single(TokenKind::ParenLeft),
            b')' => self.single(TokenKind::ParenRight),
            b'{' => self.single(TokenKind::BraceLeft),
            b'}' => self.single(TokenKind::BraceRight),
            b'[' => self.single(TokenKind::BracketLeft),
            b']' => self.single(TokenKind::BracketRight),
            b'\\' => self.single(TokenKind::DivideInt),

            b'#' => {
                self.accept();
                if is_identifier_start(self.ctx.current) {
                    self.identifier(&mut token)
                } else {
                    TokenKind::Hash
                }
            }
            b'.' => {
                self.accept();
                if self.ctx.current.is_ascii_digit() {
                    self.digits();
                    TokenKind::Number
                } else {
                    TokenKind::Dot
                }
            }
            b'!' => {
                self.accept();
                if self.eat(b'=') {
                    TokenKind::NotEquals
                } else {
                    TokenKind::Not
                }
            }
            b'<' => {
                self.accept();
                if self.eat(b'=') {
                    TokenKind::LessThanOrEqual
                } else if self.eat(b'<') {
                    if self.eat(b'=') {
                        TokenKind::AssignShiftLeft
                    } else {
                        TokenKind::ShiftLeft
                    }
                } else if self.eat(b'>') {
                    TokenKind::NotEquals
                } else {
                    TokenKind::LessThan
                }
            }
            b'>' => {
                self.accept();
                if self.eat(b'=') {
                    TokenKind::GreaterThanOrEqual
                } else if self.eat(b'>') {
                    if self.eat(b'=') {
                        TokenKind::AssignShiftRight
                    } else {
                        TokenKind::ShiftRight
                    }
                } else {
                    TokenKind::GreaterThan
                }
            }
            b'=' => {
                self.accept();
                if self.eat(b'=') {
                    TokenKind::Equals
                } else {
                    TokenKind::Assign
                }
            }
            b'+' => {
                self.accept();
                if self.eat(b'+') {
                    TokenKind::Increment
                } else if self.eat(b'=') {
                    TokenKind::AssignPlus
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                self.accept();
                if self.eat(b'-') {
                    TokenKind::Decrement
                } else if self.eat(b'=') {
                    TokenKind::AssignMinus
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => self.with_assign(TokenKind::Multiply, TokenKind::AssignMultiply),
            b'%' => self.with_assign(TokenKind::Modulus, TokenKind::AssignModulus),
            b'^' => self.with_assign(TokenKind::Pow, TokenKind::AssignPow),
            b'`' => self.with_assign(TokenKind::Xor, TokenKind::AssignXor),
            b'/' => {
                self.accept();
                if self.ctx.current == b'/' {
                    self.comment()
                } else if self.eat(b'=') {
                    TokenKind::AssignDivide
                } else {
                    TokenKind::Divide
                }
            }
            b'|' => {
                self.accept();
                if self.eat(b'|') {
                    TokenKind::OrLogical
                } else if self.eat(b'=') {
                    TokenKind::AssignOr
                } else {
                    TokenKind::OrBinary
                }
            }
            b'&' => {
                self.accept();
                if self.eat(b'&') {
                    TokenKind::AndLogical
                } else if self.eat(b'=') {
                    TokenKind::AssignAnd
                } else {
                    TokenKind::AndBinary
                }
            }
            b'"' => self.string(),

            ch if ch.is_ascii_digit() => self.number(),
            ch if is_identifier_start(ch) => {
                self.accept();
                self.identifier(&mut token)
            }
            ch if ch >= 0x80 => {
                // Keep lexemes on char boundaries: swallow the whole scalar.
                self.accept();
                while is_continuation(self.ctx.current) {
                    self.accept();
                }
                TokenKind::Unknown
            }
            _ => self.single(TokenKind::Unknown),
        };

        token.kind = kind;
        token.length = self.ctx.offset - token.offset;
        token
    }

    /// String literal: everything up to the closing quote or end of input.
    fn string(&mut self) -> TokenKind {
        self.accept(); // opening quote
        while !self.ctx.is_at_end() && self.ctx.current != b'"' {
            self.accept();
        }
        self.eat(b'"');
        TokenKind::String
    }

    /// Line comment; the leading `/` is already consumed, the newline is left.
    fn comment(&mut self) -> TokenKind {
        while !self.ctx.is_at_end() && self.ctx.current != b'\n' {
            self.accept();
        }
        TokenKind::Comment
    }

    /// Integer part, optional `.` and fraction. A bare `0` stands alone.
    fn number(&mut self) -> TokenKind {
        if self.ctx.current == b'0' {
            self.accept();
            if self.ctx.current != b'.' {
                return TokenKind::Number;
            }
        }
        self.digits();
        if self.eat(b'.') {
            self.digits();
        }
        TokenKind::Number
    }

    fn digits(&mut self) {
        while self.ctx.current.is_ascii_digit() {
            self.accept();
        }
    }

    /// Rest of an identifier whose first character is already consumed.
    fn identifier(&mut self, token: &mut Token) -> TokenKind {
        while is_identifier_part(self.ctx.current) {
            self.accept();
        }

        // Type-hint suffix: `name$`, `count!` (but not `a != b`)
        if self.ctx.current == b'$' || (self.ctx.current == b'!' && self.peek_ahead(1) != b'=') {
            self.accept();
        }

        let lexeme = &self.input[token.offset..self.ctx.offset];
        match lookup_keyword(lexeme) {
            Some(Keyword::And) => {
                token.tag = Some(Keyword::And);
                TokenKind::AndLogical
            }
            Some(Keyword::Or) => {
                token.tag = Some(Keyword::Or);
                TokenKind::OrLogical
            }
            Some(keyword) => {
                token.tag = Some(keyword);
                TokenKind::Keyword
            }
            None => TokenKind::Identifier,
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.accept();
        kind
    }

    /// `op` or `op=`.
    fn with_assign(&mut self, plain: TokenKind, assign: TokenKind) -> TokenKind {
        self.accept();
        if self.eat(b'=') {
            assign
        } else {
            plain
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ctx.current, b' ' | b'\t' | b'\r' | 0x0C) && !self.ctx.is_at_end() {
            self.accept();
        }
    }

    /// Consume the current byte if it equals `expected`.
    fn eat(&mut self, expected: u8) -> bool {
        if !self.ctx.is_at_end() && self.ctx.current == expected {
            self.accept();
            true
        } else {
            false
        }
    }

    fn peek_ahead(&self, n: usize) -> u8 {
        self.bytes.get(self.ctx.offset + n).copied().unwrap_or(0)
    }

    /// Advance one byte, keeping line, column and `current` in step.
    fn accept(&mut self) {
        if self.ctx.is_at_end() {
            return;
        }

        let byte = self.bytes[self.ctx.offset];
        self.ctx.offset += 1;

        if byte == b'\n' {
            self.ctx.line += 1;
            self.ctx.column = 1;
        } else if !is_continuation(byte) {
            self.ctx.column += 1;
        }

        self.ctx.current = self.bytes.get(self.ctx.offset).copied().unwrap_or(0);
    }
}

fn is_identifier_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_identifier_part(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}
