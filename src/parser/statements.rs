//! Statement parsing implementation
//!
//! This module handles parsing of all RPGCode statement types:
//!
//! - Control flow: `if` / `elseif` / `else`, `do`, `while`, `until`, `for`
//! - Jumps: `return`, `break`, `continue`, `goto label`
//! - Labels: `name:`
//! - Error handlers: `on error resume next`
//! - Expression statements: calls, assignments, increments
//! - Legacy comments: a line starting with `*` is skipped
//!
//! Every statement must be followed by an end of statement: an optional
//! comment, then a newline, `;`, or a closing `}` / end of input (which are
//! left for the enclosing construct).
//!
//! # Grammar
//!
//! ```text
//! block     ::= eol* "{" (separator | statement)* "}"
//! statement ::= (return_stmt | if_stmt | do_stmt | while_stmt | until_stmt
//!             | for_stmt | break_stmt | continue_stmt | goto_stmt | label
//!             | on_error | expression) eos
//! if_stmt   ::= "if" "(" expression ")" block
//!               (eol* "elseif" "(" expression ")" block)* [eol* "else" block]
//! do_stmt   ::= "do" block "while" "(" expression ")"
//! for_stmt  ::= "for" "(" [expression] ";" [relational] ";" [expression] ")" block
//! label     ::= identifier ":"
//! on_error  ::= "on" "error" "resume" "next"
//! eos       ::= [comment] (eol | ";" | &"}" | &end)
//! ```
//!
//! The `elseif` and `else` branches are parsed for diagnostics and then
//! discarded; the resulting [`Statement::Conditional`] holds only the `if`
//! branch.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::Parser;
use crate::parser::token::{Keyword, TokenKind};

impl Parser<'_> {
    /// Parse `{ statements }`, allowing newlines and comments before `{`.
    pub(crate) fn parse_block(&mut self, ctx: &str) -> Option<Block> {
        self.skip_blank_lines();
        let start = self.begin_range();
        self.expect(TokenKind::BraceLeft, ctx)?;

        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            let token = self.peek();

            match token.kind {
                TokenKind::BraceRight => {
                    self.accept();
                    break;
                }
                TokenKind::End => {
                    self.error("expected '}' to close block, found end of file");
                    break;
                }
                _ if self.starts_statement() => {
                    if let Some(statement) = self.parse_statement() {
                        statements.push(statement);
                    }
                }
                _ => {
                    let found = self.describe(&token);
                    self.error(format!("unexpected token in block: {found}"));
                }
            }
        }

        Some(Block {
            statements,
            range: self.end_range(start),
        })
    }

    /// True if the current token can begin a statement.
    pub(crate) fn starts_statement(&mut self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::ParenLeft
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Multiply => true,
            TokenKind::Keyword => matches!(
                token.tag,
                Some(
                    Keyword::Return
                        | Keyword::If
                        | Keyword::Do
                        | Keyword::While
                        | Keyword::Until
                        | Keyword::For
                        | Keyword::Break
                        | Keyword::Continue
                        | Keyword::Goto
                        | Keyword::On
                        | Keyword::True
                        | Keyword::False
                )
            ),
            _ => false,
        }
    }

    /// Parse a statement and its end of statement.
    ///
    /// Returns `None` when the statement was malformed (the errors have been
    /// reported) or when it produces no node, such as a legacy comment.
    pub(crate) fn parse_statement(&mut self) -> Option<Statement> {
        let errors_before = self.error_count();
        let token = self.peek();

        let keyword = match token.kind {
            TokenKind::Keyword => token.tag,
            _ => None,
        };

        let statement = match keyword {
            Some(Keyword::Return) => self.parse_return(),
            Some(Keyword::If) => self.parse_conditional(),
            Some(Keyword::Do) => self.parse_do_loop(),
            Some(Keyword::While) => self.parse_loop(LoopKind::While),
            Some(Keyword::Until) => self.parse_loop(LoopKind::Until),
            Some(Keyword::For) => self.parse_for_loop(),
            Some(Keyword::Break) => self.parse_flow_control(FlowControlKind::Break),
            Some(Keyword::Continue) => self.parse_flow_control(FlowControlKind::Continue),
            Some(Keyword::Goto) => self.parse_flow_control(FlowControlKind::Goto),
            Some(Keyword::On) => self.parse_error_handler(),
            _ if token.kind == TokenKind::Multiply => {
                self.skip_legacy_comment();
                None
            }
            _ if token.kind == TokenKind::Identifier
                && self.lookahead(1).kind == TokenKind::Colon =>
            {
                self.parse_label()
            }
            _ => self.parse_expression_statement(),
        };

        let failed = self.error_count() > errors_before;
        if statement.is_some() || !failed {
            self.end_of_statement();
        }

        if self.options.recover_to_statement_boundary && self.error_count() > errors_before {
            self.synchronize();
        }

        statement
    }

    /// Require an end of statement after a construct.
    pub(crate) fn end_of_statement(&mut self) {
        self.match_token(TokenKind::Comment);

        let token = self.peek();
        match token.kind {
            TokenKind::BraceRight | TokenKind::End => {}
            kind if kind.is_terminator() => {
                self.accept();
            }
            _ => {
                let found = self.describe(&token);
                self.error(format!("expected end of statement, found {found}"));
            }
        }
    }

    /// True if nothing but an end of statement follows.
    fn at_statement_end(&mut self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Eol
                | TokenKind::Semicolon
                | TokenKind::Comment
                | TokenKind::BraceRight
                | TokenKind::End
        )
    }

    /// `* text` on its own line: skip the raw text up to the end of the line.
    fn skip_legacy_comment(&mut self) {
        self.accept(); // consume '*'
        if self.pending.is_empty() {
            self.lexer.skip_line();
        }
        // tokens already queued past the '*' are dropped one by one
        while !matches!(self.peek().kind, TokenKind::Eol | TokenKind::End) {
            self.accept();
        }
    }

    fn parse_return(&mut self) -> Option<Statement> {
        let start = self.begin_range();
        self.accept(); // consume 'return'

        let value = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression()?)
        };

        Some(Statement::Return {
            value,
            range: self.end_range(start),
        })
    }

    /// `( expression )`
    fn parse_condition(&mut self, ctx: &str) -> Option<Expression> {
        self.expect(TokenKind::ParenLeft, ctx)?;
        let condition = self.parse_expression();
        self.expect(TokenKind::ParenRight, "after condition");
        condition
    }

    fn parse_conditional(&mut self) -> Option<Statement> {
        let start = self.begin_range();
        self.accept(); // consume 'if'

        let condition = self.parse_condition("after 'if'");
        let body = self.parse_block("for 'if' body");
        self.parse_else_branches();

        Some(Statement::Conditional {
            condition: condition?,
            body: body?,
            range: self.end_range(start),
        })
    }

    /// Consume any `elseif` / `else` branches following an `if` body,
    /// possibly on later lines.
    fn parse_else_branches(&mut self) {
        loop {
            let k = self.next_significant();
            let token = self.lookahead(k);

            if token.is_keyword(Keyword::ElseIf) {
                self.skip_blank_lines();
                self.accept();
                let _ = self.parse_condition("after 'elseif'");
                let _ = self.parse_block("for 'elseif' body");
                log::debug!("line {}: 'elseif' branch discarded", token.line);
            } else if token.is_keyword(Keyword::Else) {
                self.skip_blank_lines();
                self.accept();
                if self.match_keyword(Keyword::If) {
                    // `else if` chains like `elseif`
                    let _ = self.parse_condition("after 'else if'");
                    let _ = self.parse_block("for 'else if' body");
                    log::debug!("line {}: 'else if' branch discarded", token.line);
                    continue;
                }
                let _ = self.parse_block("for 'else' body");
                log::debug!("line {}: 'else' branch discarded", token.line);
                break;
            } else {
                break;
            }
        }
    }

    /// `do { } while (condition)`; `while` must follow on the same line.
    fn parse_do_loop(&mut self) -> Option<Statement> {
        let start = self.begin_range();
        self.accept(); // consume 'do'

        let body = self.parse_block("for 'do' body");
        self.expect_keyword(Keyword::While, "after 'do' body")?;
        let condition = self.parse_condition("after 'while'");

        Some(Statement::Loop {
            kind: LoopKind::Do,
            condition: condition?,
            body: body?,
            range: self.end_range(start),
        })
    }

    /// `while (condition) { }` and `until (condition) { }`
    fn parse_loop(&mut self, kind: LoopKind) -> Option<Statement> {
        let start = self.begin_range();
        self.accept(); // consume 'while' or 'until'

        let ctx = match kind {
            LoopKind::Until => "after 'until'",
            _ => "after 'while'",
        };
        let condition = self.parse_condition(ctx);
        let body = self.parse_block("for loop body");

        Some(Statement::Loop {
            kind,
            condition: condition?,
            body: body?,
            range: self.end_range(start),
        })
    }

    fn parse_for_loop(&mut self) -> Option<Statement> {
        let start = self.begin_range();
        self.accept(); // consume 'for'

        self.expect(TokenKind::ParenLeft, "after 'for'")?;

        let initializer = if self.check(TokenKind::Semicolon) {
            None
        } else {
            self.parse_expression()
        };
        self.expect(TokenKind::Semicolon, "after 'for' initializer");

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            self.parse_relational()
        };
        self.expect(TokenKind::Semicolon, "after 'for' condition");

        let iterator = if self.check(TokenKind::ParenRight) {
            None
        } else {
            self.parse_expression()
        };
        self.expect(TokenKind::ParenRight, "after 'for' clauses");

        let body = self.parse_block("for 'for' body")?;

        Some(Statement::ForLoop {
            initializer,
            condition,
            iterator,
            body,
            range: self.end_range(start),
        })
    }

    fn parse_flow_control(&mut self, kind: FlowControlKind) -> Option<Statement> {
        let start = self.begin_range();
        self.accept(); // consume keyword

        let target = match kind {
            FlowControlKind::Goto => Some(self.expect_identifier("after 'goto'")?),
            _ => None,
        };

        Some(Statement::FlowControl {
            kind,
            target,
            range: self.end_range(start),
        })
    }

    fn parse_label(&mut self) -> Option<Statement> {
        let start = self.begin_range();
        let token = self.accept();
        let name = self.identifier(&token);
        self.accept(); // consume ':'

        Some(Statement::Label {
            name,
            range: self.end_range(start),
        })
    }

    /// `on error resume next`
    fn parse_error_handler(&mut self) -> Option<Statement> {
        let start = self.begin_range();
        self.accept(); // consume 'on'

        self.expect_keyword(Keyword::Error, "after 'on'")?;
        self.expect_keyword(Keyword::Resume, "after 'on error'")?;
        self.expect_keyword(Keyword::Next, "after 'on error resume'")?;

        Some(Statement::ErrorHandler {
            kind: ErrorHandlerKind::ResumeNext,
            range: self.end_range(start),
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let start = self.begin_range();
        let expression = self.parse_expression()?;

        Some(Statement::Expression {
            expression,
            range: self.end_range(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::{Parser, ParserOptions};

    fn body_of(source: &str) -> (Vec<Statement>, usize) {
        let mut parser = Parser::new(source);
        let unit = parser.parse();
        let statements = unit
            .functions
            .into_iter()
            .next()
            .and_then(|f| f.body)
            .map(|b| b.statements)
            .unwrap_or_default();
        (statements, parser.errors().len())
    }

    #[test]
    fn test_if_with_else_on_later_line() {
        let source = "function f() {\n\
                      if (a == 1) {\n\
                      x = 1\n\
                      }\n\
                      // trailing comment\n\
                      elseif (a == 2) {\n\
                      x = 2\n\
                      }\n\
                      else {\n\
                      x = 3\n\
                      }\n\
                      y = 4\n\
                      }";
        let (statements, errors) = body_of(source);
        assert_eq!(errors, 0);
        assert_eq!(statements.len(), 2);
        match &statements[0] {
            Statement::Conditional { body, .. } => assert_eq!(body.statements.len(), 1),
            other => panic!("Expected conditional, got {:?}", other),
        }
        assert!(matches!(statements[1], Statement::Expression { .. }));
    }

    #[test]
    fn test_loops() {
        let source = "function f() {\n\
                      while (i < 10) { i++ }\n\
                      until (done) { }\n\
                      do { i-- } while (i > 0)\n\
                      for (i = 0; i < 10; i++) { }\n\
                      for (;;) { break }\n\
                      }";
        let (statements, errors) = body_of(source);
        assert_eq!(errors, 0);
        let kinds: Vec<_> = statements
            .iter()
            .map(|s| match s {
                Statement::Loop { kind, .. } => format!("{:?}", kind),
                Statement::ForLoop { .. } => "For".to_string(),
                other => panic!("Expected a loop, got {:?}", other),
            })
            .collect();
        assert_eq!(kinds, ["While", "Until", "Do", "For", "For"]);

        match &statements[4] {
            Statement::ForLoop {
                initializer,
                condition,
                iterator,
                body,
                ..
            } => {
                assert!(initializer.is_none() && condition.is_none() && iterator.is_none());
                assert!(matches!(
                    body.statements[0],
                    Statement::FlowControl {
                        kind: FlowControlKind::Break,
                        ..
                    }
                ));
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_labels_and_goto() {
        let (statements, errors) =
            body_of("function f() {\ntop:\ngoto top; continue\non error resume next\n}");
        assert_eq!(errors, 0);
        assert_eq!(statements.len(), 4);
        match &statements[0] {
            Statement::Label { name, .. } => assert_eq!(name.name, "top"),
            other => panic!("Expected label, got {:?}", other),
        }
        match &statements[1] {
            Statement::FlowControl {
                kind: FlowControlKind::Goto,
                target: Some(target),
                ..
            } => assert_eq!(target.name, "top"),
            other => panic!("Expected goto, got {:?}", other),
        }
        assert!(matches!(
            statements[2],
            Statement::FlowControl {
                kind: FlowControlKind::Continue,
                target: None,
                ..
            }
        ));
        assert!(matches!(
            statements[3],
            Statement::ErrorHandler {
                kind: ErrorHandlerKind::ResumeNext,
                ..
            }
        ));
    }

    #[test]
    fn test_legacy_comment_line() {
        let (statements, errors) = body_of("function f() {\n* old style comment (with stuff)\nx = 1\n}");
        assert_eq!(errors, 0);
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_legacy_comment_with_unbalanced_quote() {
        let source = "function f() {\n* don't say \"hi\n x = 1\n y = 2\n}\nfunction g() { }\n";
        let mut parser = Parser::new(source);
        let unit = parser.parse();

        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        assert_eq!(unit.functions.len(), 2);
        let f = unit.functions[0].body.as_ref().expect("body of f");
        assert_eq!(f.statements.len(), 2);
        assert_eq!(unit.functions[1].name.name, "g");
    }

    #[test]
    fn test_missing_end_of_statement() {
        let mut parser = Parser::new("x = 1 y = 2");
        let unit = parser.parse();
        assert!(parser.errors()[0].message.contains("expected end of statement"));
        assert_eq!(parser.errors()[0].column, 7);
        // 'y' is discarded by the first error, the stray '=' by the second
        assert_eq!(parser.errors().len(), 2);
        assert_eq!(unit.statements.len(), 2);
    }

    #[test]
    fn test_recover_to_statement_boundary() {
        let source = "x = ) 1 2 3\ny = 2\n";

        let mut parser = Parser::new(source);
        parser.parse();
        let without = parser.errors().len();

        let options = ParserOptions {
            recover_to_statement_boundary: true,
            ..ParserOptions::default()
        };
        let mut parser = Parser::with_options(source, options);
        let unit = parser.parse();

        assert_eq!(parser.errors().len(), 1);
        assert!(without > 1);
        assert_eq!(unit.statements.len(), 1);
    }

    #[test]
    fn test_return_without_value() {
        let (statements, errors) = body_of("function f() { return }");
        assert_eq!(errors, 0);
        assert!(matches!(statements[0], Statement::Return { value: None, .. }));
    }
}
