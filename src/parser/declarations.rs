//! Declaration parsing implementation
//!
//! This module handles parsing of RPGCode declarations:
//!
//! - Class definitions: `class Name [: Base, ...] { ... }`
//! - Visibility labels inside classes: `public:`, `private:`, `protected:`
//! - Fields: `[var] name [, name]*`
//! - Functions and methods: `[inline] function name(params) { ... }`
//! - Abstract functions: `function name(params) = 0`
//!
//! # Grammar
//!
//! ```text
//! class_def    ::= "class" identifier [":" identifier ("," identifier)*]
//!                  eol* "{" class_member* "}"
//! class_member ::= visibility ":" | field_list eos | function_def
//! visibility   ::= "public" | "private" | "protected"
//! field_list   ::= ["var"] identifier ("," identifier)*
//! function_def ::= ["inline"] ("function" | "method") identifier
//!                  "(" [identifier ("," identifier)*] ")" ("=" number | block)
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::Parser;
use crate::parser::token::{Keyword, TokenKind};

impl Parser<'_> {
    /// True if the current token starts a function declaration.
    pub(crate) fn at_function_declaration(&mut self) -> bool {
        self.check_keyword(Keyword::Function) || self.check_keyword(Keyword::Inline)
    }

    /// Parse a class definition. The current token is `class`.
    ///
    /// A class without a name is reported and dropped once its body has
    /// been consumed.
    pub(crate) fn parse_class_declaration(&mut self) -> Option<ClassDeclaration> {
        let start = self.begin_range();
        self.accept(); // consume 'class'

        let name = self.expect_identifier("after 'class'");

        let mut inheritance = Vec::new();
        if self.match_token(TokenKind::Colon) {
            loop {
                if let Some(base) = self.expect_identifier("in base class list") {
                    inheritance.push(base);
                }
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let mut functions = Vec::new();
        let mut fields = Vec::new();

        self.skip_blank_lines();
        if self.expect(TokenKind::BraceLeft, "to open class body").is_some() {
            let mut visibility = Visibility::Public;

            loop {
                self.skip_separators();
                let token = self.peek();

                match token.kind {
                    TokenKind::BraceRight => {
                        self.accept();
                        break;
                    }
                    TokenKind::End => {
                        self.error("expected '}' to close class body, found end of file");
                        break;
                    }
                    TokenKind::Identifier => self.parse_field_list(visibility, &mut fields),
                    TokenKind::Keyword => match token.tag {
                        Some(Keyword::Public) | Some(Keyword::Private) | Some(Keyword::Protected) => {
                            visibility = match token.tag {
                                Some(Keyword::Private) => Visibility::Private,
                                Some(Keyword::Protected) => Visibility::Protected,
                                _ => Visibility::Public,
                            };
                            self.accept();
                            self.expect(TokenKind::Colon, "after visibility label");
                        }
                        Some(Keyword::Var) => self.parse_field_list(visibility, &mut fields),
                        Some(Keyword::Function) | Some(Keyword::Inline) => {
                            if let Some(function) = self.parse_function_declaration(visibility) {
                                functions.push(function);
                            }
                        }
                        _ => {
                            let found = self.describe(&token);
                            self.error(format!("unexpected token in class body: {found}"));
                        }
                    },
                    _ => {
                        let found = self.describe(&token);
                        self.error(format!("unexpected token in class body: {found}"));
                    }
                }
            }
        }

        let range = self.end_range(start);
        let name = name?;
        log::trace!(
            "class '{}': {} fields, {} functions",
            name.name,
            fields.len(),
            functions.len()
        );

        Some(ClassDeclaration {
            name,
            inheritance,
            functions,
            fields,
            range,
        })
    }

    /// Parse `[var] a, b, c` followed by an end of statement.
    fn parse_field_list(&mut self, visibility: Visibility, fields: &mut Vec<ClassFieldDeclaration>) {
        self.match_keyword(Keyword::Var);

        loop {
            let Some(name) = self.expect_identifier("in field declaration") else {
                return;
            };
            fields.push(ClassFieldDeclaration {
                range: name.range,
                name,
                visibility,
            });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.end_of_statement();
    }

    /// Parse a function definition
    pub(crate) fn parse_function_declaration(
        &mut self,
        visibility: Visibility,
    ) -> Option<FunctionDeclaration> {
        let start = self.begin_range();

        let is_inline = self.match_keyword(Keyword::Inline);
        // `inline name()` is accepted without the 'function' keyword
        if !self.match_keyword(Keyword::Function) && !is_inline {
            self.expect_keyword(Keyword::Function, "to start function declaration")?;
        }

        let name = self.expect_identifier("for function name");
        let parameters = self.parse_parameter_list();

        let (body, is_abstract) = if self.match_token(TokenKind::Assign) {
            self.expect(TokenKind::Number, "after '=' in abstract function declaration");
            (None, true)
        } else {
            (self.parse_block("for function body"), false)
        };

        let range = self.end_range(start);
        let name = name?;
        log::trace!("function '{}' with {} parameters", name.name, parameters.len());

        Some(FunctionDeclaration {
            name,
            parameters,
            body,
            is_inline,
            is_abstract,
            visibility,
            range,
        })
    }

    /// Parse `(a, b, ...)`
    fn parse_parameter_list(&mut self) -> Vec<Parameter> {
        let mut parameters = Vec::new();

        if self.expect(TokenKind::ParenLeft, "after function name").is_none() {
            return parameters;
        }
        if self.match_token(TokenKind::ParenRight) {
            return parameters;
        }

        loop {
            if self.check(TokenKind::ParenRight) {
                // trailing comma; the reported ')' still closes the list
                self.error("expected parameter name, found ')'");
                return parameters;
            }

            let start = self.begin_range();
            if let Some(name) = self.expect_identifier("in parameter list") {
                parameters.push(Parameter {
                    name,
                    range: self.end_range(start),
                });
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::ParenRight, "after parameters");
        parameters
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_ok(source: &str) -> CompilationUnit {
        let mut parser = Parser::new(source);
        let unit = parser.parse();
        assert!(parser.errors().is_empty(), "unexpected errors: {:?}", parser.errors());
        unit
    }

    #[test]
    fn test_class_with_visibility_sections() {
        let source = "class Hero : Actor, Drawable\n\
                      {\n\
                      \tvar hp, mp\n\
                      private:\n\
                      \tsecret\n\
                      \tfunction heal(amount) { hp += amount }\n\
                      protected:\n\
                      \tmethod draw() = 0\n\
                      }\n";
        let unit = parse_ok(source);

        assert_eq!(unit.classes.len(), 1);
        let hero = unit.class("Hero").expect("class Hero");
        let bases: Vec<_> = hero.inheritance.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(bases, ["Actor", "Drawable"]);

        let fields: Vec<_> = hero
            .fields
            .iter()
            .map(|f| (f.name.name.as_str(), f.visibility))
            .collect();
        assert_eq!(
            fields,
            [
                ("hp", Visibility::Public),
                ("mp", Visibility::Public),
                ("secret", Visibility::Private),
            ]
        );

        assert_eq!(hero.functions.len(), 2);
        let heal = &hero.functions[0];
        assert_eq!(heal.visibility, Visibility::Private);
        assert_eq!(heal.parameters.len(), 1);
        assert!(heal.body.is_some());

        let draw = &hero.functions[1];
        assert_eq!(draw.visibility, Visibility::Protected);
        assert!(draw.is_abstract);
        assert!(draw.body.is_none());
    }

    #[test]
    fn test_inline_function() {
        let unit = parse_ok("inline function twice(x) { return x * 2 }");
        let twice = unit.function("twice").expect("function twice");
        assert!(twice.is_inline);
        assert!(!twice.is_abstract);
        assert_eq!(twice.visibility, Visibility::Public);
        let names: Vec<_> = twice.parameters.iter().map(|p| p.name.name.as_str()).collect();
        assert_eq!(names, ["x"]);
    }

    #[test]
    fn test_brace_on_next_line() {
        let unit = parse_ok("function main(a, b)\n// opening brace below\n{\n}\n");
        assert_eq!(unit.functions[0].parameters.len(), 2);
    }

    #[test]
    fn test_function_range() {
        let unit = parse_ok("  function f() { }  ");
        let f = &unit.functions[0];
        assert_eq!(f.range.start.offset, 2);
        assert_eq!(f.range.end.offset, 18);
        assert_eq!(f.name.range.start.column, 12);
    }

    #[test]
    fn test_missing_function_name_is_dropped() {
        let mut parser = Parser::new("function () { }");
        let unit = parser.parse();
        assert!(unit.functions.is_empty());
        let first = &parser.errors()[0];
        assert_eq!((first.line, first.column), (1, 10));
    }

    #[test]
    fn test_trailing_comma_in_parameters() {
        let mut parser = Parser::new("function f(a,) { }");
        let unit = parser.parse();
        assert_eq!(parser.errors().len(), 1);
        assert_eq!(unit.functions[0].parameters.len(), 1);
        assert!(unit.functions[0].body.is_some());
    }
}
