//! RPGCode source code parser
//!
//! This module transforms RPGCode source text into an Abstract Syntax Tree (AST):
//! - [`token`]: Token kinds, keywords and token records
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST)
//! - [`listener`]: Parse error reporting
//! - [`ast`]: AST node definitions
//!
//! # Language
//!
//! RPGCode is a line-oriented scripting language: a newline ends a
//! statement, as does `;`. Programs contain classes, functions and loose
//! statements. Keywords are case-insensitive; identifiers may carry the
//! legacy `#` prefix and `$` / `!` suffix sigils.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one function per precedence
//! level. Errors never abort the parse: each is reported to listeners and
//! one token is discarded, so a single pass yields both a (possibly partial)
//! tree and every error found.
//!
//! ```
//! let outcome = rpgcode::parser::parse("function main() { return 0 <> 4; } // comment");
//! assert!(outcome.is_success());
//! assert_eq!(outcome.unit.functions[0].name.name, "main");
//! ```

pub mod ast;
pub mod lexer;
pub mod listener;
pub mod parse;
pub mod token;

mod declarations;
mod expressions;
mod statements;

pub use ast::CompilationUnit;
pub use lexer::Lexer;
pub use listener::{ErrorCollector, ParseError, ParserListener, SharedListener};
pub use parse::{Parser, ParserOptions};
pub use token::{Keyword, Token, TokenKind};

/// Result of parsing a whole source with [`parse`]
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub unit: CompilationUnit,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    /// True if no errors were reported.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse `source` with default options.
pub fn parse(source: &str) -> ParseOutcome {
    parse_with_options(source, ParserOptions::default())
}

pub fn parse_with_options(source: &str, options: ParserOptions) -> ParseOutcome {
    let mut parser = Parser::with_options(source, options);
    let unit = parser.parse();
    ParseOutcome {
        unit,
        errors: parser.take_errors(),
    }
}
