//! Lexical vocabulary for RPGCode
//!
//! A [`Token`] is a small `Copy` record: its kind, an optional [`Keyword`]
//! tag and the span it covers in the source buffer. The lexeme itself is
//! never stored; [`Token::lexeme`] slices it back out of the source on demand.

use super::ast::SourceLocation;
use std::fmt;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Unknown,
    End,
    Eol,

    // Punctuation
    Hash,      // #
    Dollar,    // $
    Semicolon, // ;
    Comma,     // ,
    Colon,     // :
    Dot,       // .

    // Arithmetic
    Plus,      // +
    Minus,     // -
    Multiply,  // *
    Divide,    // /
    DivideInt, // \
    Modulus,   // %
    Pow,       // ^
    Increment, // ++
    Decrement, // --

    // Shift
    ShiftLeft,  // <<
    ShiftRight, // >>

    // Relational
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    LessThan,           // <
    LessThanOrEqual,    // <=
    Equals,             // ==
    NotEquals,          // != or <>

    // Logical and bitwise
    Not,        // !
    AndLogical, // && or `and`
    AndBinary,  // &
    OrLogical,  // || or `or`
    OrBinary,   // |
    Xor,        // `

    // Assignment
    Assign,           // =
    AssignPlus,       // +=
    AssignMinus,      // -=
    AssignMultiply,   // *=
    AssignDivide,     // /=
    AssignModulus,    // %=
    AssignPow,        // ^=
    AssignOr,         // |=
    AssignAnd,        // &=
    AssignXor,        // `=
    AssignShiftLeft,  // <<=
    AssignShiftRight, // >>=

    // Grouping
    ParenLeft,    // (
    ParenRight,   // )
    BracketLeft,  // [
    BracketRight, // ]
    BraceLeft,    // {
    BraceRight,   // }

    // Literals
    Comment,
    Identifier,
    String,
    Number,
    Keyword,
}

impl TokenKind {
    /// True for the tokens that separate statements.
    pub fn is_terminator(self) -> bool {
        matches!(self, TokenKind::Eol | TokenKind::Semicolon)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Unknown => "unknown character",
            TokenKind::End => "end of file",
            TokenKind::Eol => "end of line",
            TokenKind::Hash => "'#'",
            TokenKind::Dollar => "'$'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Multiply => "'*'",
            TokenKind::Divide => "'/'",
            TokenKind::DivideInt => "'\\'",
            TokenKind::Modulus => "'%'",
            TokenKind::Pow => "'^'",
            TokenKind::Increment => "'++'",
            TokenKind::Decrement => "'--'",
            TokenKind::ShiftLeft => "'<<'",
            TokenKind::ShiftRight => "'>>'",
            TokenKind::GreaterThan => "'>'",
            TokenKind::GreaterThanOrEqual => "'>='",
            TokenKind::LessThan => "'<'",
            TokenKind::LessThanOrEqual => "'<='",
            TokenKind::Equals => "'=='",
            TokenKind::NotEquals => "'!='",
            TokenKind::Not => "'!'",
            TokenKind::AndLogical => "'&&'",
            TokenKind::AndBinary => "'&'",
            TokenKind::OrLogical => "'||'",
            TokenKind::OrBinary => "'|'",
            TokenKind::Xor => "'`'",
            TokenKind::Assign => "'='",
            TokenKind::AssignPlus => "'+='",
            TokenKind::AssignMinus => "'-='",
            TokenKind::AssignMultiply => "'*='",
            TokenKind::AssignDivide => "'/='",
            TokenKind::AssignModulus => "'%='",
            TokenKind::AssignPow => "'^='",
            TokenKind::AssignOr => "'|='",
            TokenKind::AssignAnd => "'&='",
            TokenKind::AssignXor => "'`='",
            TokenKind::AssignShiftLeft => "'<<='",
            TokenKind::AssignShiftRight => "'>>='",
            TokenKind::ParenLeft => "'('",
            TokenKind::ParenRight => "')'",
            TokenKind::BracketLeft => "'['",
            TokenKind::BracketRight => "']'",
            TokenKind::BraceLeft => "'{'",
            TokenKind::BraceRight => "'}'",
            TokenKind::Comment => "comment",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string literal",
            TokenKind::Number => "number literal",
            TokenKind::Keyword => "keyword",
        };
        f.write_str(text)
    }
}

/// Keyword identities carried in [`Token::tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Function,
    Return,
    Public,
    Private,
    Protected,
    Var,
    Do,
    While,
    Until,
    Loop,
    For,
    Break,
    Continue,
    Goto,
    If,
    Else,
    ElseIf,
    Switch,
    Case,
    Default,
    Null,
    True,
    False,
    Inline,
    And,
    Or,
    This,
    On,
    Error,
    Resume,
    Next,
}

impl Keyword {
    /// Canonical (lowercase) spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Function => "function",
            Keyword::Return => "return",
            Keyword::Public => "public",
            Keyword::Private => "private",
            Keyword::Protected => "protected",
            Keyword::Var => "var",
            Keyword::Do => "do",
            Keyword::While => "while",
            Keyword::Until => "until",
            Keyword::Loop => "loop",
            Keyword::For => "for",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::Goto => "goto",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::ElseIf => "elseif",
            Keyword::Switch => "switch",
            Keyword::Case => "case",
            Keyword::Default => "default",
            Keyword::Null => "null",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Inline => "inline",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::This => "this",
            Keyword::On => "on",
            Keyword::Error => "error",
            Keyword::Resume => "resume",
            Keyword::Next => "next",
        }
    }
}

/// A lexical token and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Keyword identity, `None` unless the lexeme matched the keyword table.
    pub tag: Option<Keyword>,
    /// Byte offset of the first character.
    pub offset: usize,
    /// Length in bytes.
    pub length: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// True if this token is the given keyword.
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword && self.tag == Some(keyword)
    }

    /// The source text this token denotes.
    pub fn lexeme<'src>(&self, source: &'src str) -> &'src str {
        &source[self.offset..self.offset + self.length]
    }

    pub fn start_location(&self) -> SourceLocation {
        SourceLocation::new(self.offset, self.line, self.column)
    }

    /// Position just past the last character of the token.
    ///
    /// String literals may contain newlines, so the lexeme is scanned rather
    /// than assuming the token sits on one line.
    pub fn end_location(&self, source: &str) -> SourceLocation {
        let lexeme = self.lexeme(source);
        match lexeme.rfind('\n') {
            Some(newline) => SourceLocation::new(
                self.offset + self.length,
                self.line + lexeme.matches('\n').count(),
                1 + lexeme[newline + 1..].chars().count(),
            ),
            None => SourceLocation::new(
                self.offset + self.length,
                self.line,
                self.column + lexeme.chars().count(),
            ),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(keyword) if self.kind == TokenKind::Keyword => {
                write!(f, "({:04}, {:04}) keyword '{}'", self.line, self.column, keyword.as_str())
            }
            _ => write!(f, "({:04}, {:04}) {}", self.line, self.column, self.kind),
        }
    }
}
