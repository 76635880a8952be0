//! Expression parsing implementation
//!
//! This module handles parsing of RPGCode expressions with one recursive
//! descent function per precedence level.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, `true` / `false`
//! - Identifiers, including sigils: `#mwin`, `name$`, `flag!`
//! - Calls: `name(args)`
//! - Array access: `name[index]`, optionally followed by a `$` or `!` sigil
//! - Postfix: `name++`, `name--`
//! - Unary: `+`, `-`
//! - Binary and assignment operators (see below)
//!
//! # Precedence
//!
//! From loosest to tightest binding:
//!
//! ```text
//! assignment     =  +=  -=  *=  /=  %=  ^=  <<=  >>=  &=  |=  `=
//! logical        &&  ||  and  or
//! bitwise        &  |  `
//! relational     >  >=  <  <=  ==  !=  <>
//! shift          <<  >>
//! additive       +  -
//! multiplicative *  /  \  %  ^
//! unary          +  -
//! primary
//! ```
//!
//! Every level is right-associative: the right operand is parsed at the same
//! level, so `1 - 2 - 3` groups as `1 - (2 - 3)`.
//!
//! # Nesting
//!
//! Nesting is bounded by [`MAX_EXPRESSION_DEPTH`]. Each operator that
//! recurses costs one unit; a sub-expression in parentheses, arguments or an
//! index descends through every precedence level and costs
//! [`GROUP_DEPTH`]. Past the limit the parser reports "expression nested too
//! deeply" instead of exhausting the stack.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::Parser;
use crate::parser::token::{Keyword, TokenKind};

type LevelFn<'src> = fn(&mut Parser<'src>) -> Option<Expression>;

/// Nesting budget of a single expression.
pub(crate) const MAX_EXPRESSION_DEPTH: usize = 256;

/// Cost of one parenthesized, argument or index sub-expression.
pub(crate) const GROUP_DEPTH: usize = 8;

impl<'src> Parser<'src> {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Option<Expression> {
        self.nested(GROUP_DEPTH, Self::parse_assignment)
    }

    /// Run `parse` one nesting level deeper, or report and give up once the
    /// budget is spent.
    fn nested(&mut self, cost: usize, parse: LevelFn<'src>) -> Option<Expression> {
        if self.depth + cost > MAX_EXPRESSION_DEPTH {
            self.error("expression nested too deeply");
            return None;
        }
        self.depth += cost;
        let expr = parse(self);
        self.depth -= cost;
        expr
    }

    /// Parse assignment (right-associative)
    fn parse_assignment(&mut self) -> Option<Expression> {
        let start = self.begin_range();
        let symbol = self.parse_logical()?;

        let Some(op) = assign_op(self.peek().kind) else {
            return Some(symbol);
        };
        self.accept();

        let value = self.nested(1, Self::parse_assignment)?;
        Some(Expression::Assignment {
            op,
            symbol: Box::new(symbol),
            value: Box::new(value),
            range: self.end_range(start),
        })
    }

    fn parse_logical(&mut self) -> Option<Expression> {
        self.parse_binary(Self::parse_bitwise, Self::parse_logical, logical_op)
    }

    fn parse_bitwise(&mut self) -> Option<Expression> {
        self.parse_binary(Self::parse_relational, Self::parse_bitwise, bitwise_op)
    }

    /// Also the entry point for a `for` loop condition.
    pub(crate) fn parse_relational(&mut self) -> Option<Expression> {
        self.parse_binary(Self::parse_shift, Self::parse_relational, relational_op)
    }

    fn parse_shift(&mut self) -> Option<Expression> {
        self.parse_binary(Self::parse_additive, Self::parse_shift, shift_op)
    }

    fn parse_additive(&mut self) -> Option<Expression> {
        self.parse_binary(Self::parse_multiplicative, Self::parse_additive, additive_op)
    }

    fn parse_multiplicative(&mut self) -> Option<Expression> {
        self.parse_binary(Self::parse_unary, Self::parse_multiplicative, multiplicative_op)
    }

    /// `operand [op same_level]` for one binary precedence level.
    fn parse_binary(
        &mut self,
        operand: LevelFn<'src>,
        same_level: LevelFn<'src>,
        op_for: fn(TokenKind) -> Option<BinaryOp>,
    ) -> Option<Expression> {
        let start = self.begin_range();
        let left = operand(self)?;

        let Some(op) = op_for(self.peek().kind) else {
            return Some(left);
        };
        self.accept();

        let right = self.nested(1, same_level)?;
        Some(Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            range: self.end_range(start),
        })
    }

    fn parse_unary(&mut self) -> Option<Expression> {
        let start = self.begin_range();
        let op = match self.peek().kind {
            TokenKind::Plus => UnaryOp::Positive,
            TokenKind::Minus => UnaryOp::Negative,
            _ => return self.parse_primary(),
        };
        self.accept();

        let operand = self.nested(1, Self::parse_unary)?;
        Some(Expression::Unary {
            op,
            operand: Box::new(operand),
            range: self.end_range(start),
        })
    }

    fn parse_primary(&mut self) -> Option<Expression> {
        let start = self.begin_range();
        let token = self.peek();

        match token.kind {
            TokenKind::ParenLeft => {
                self.accept();
                let mut inner = self.parse_expression();
                self.expect(TokenKind::ParenRight, "to close parenthesized expression");
                if let Some(inner) = inner.as_mut() {
                    inner.set_range(self.end_range(start));
                }
                inner
            }

            TokenKind::Number => {
                self.accept();
                match token.lexeme(self.source()).parse::<f64>() {
                    Ok(value) => Some(Expression::Number {
                        value,
                        range: self.end_range(start),
                    }),
                    Err(_) => {
                        let lexeme = token.lexeme(self.source());
                        self.report(&token, format!("invalid number literal '{lexeme}'"));
                        None
                    }
                }
            }

            TokenKind::String => {
                self.accept();
                Some(Expression::String {
                    value: string_value(token.lexeme(self.source())).to_string(),
                    range: self.end_range(start),
                })
            }

            TokenKind::Keyword
                if token.is_keyword(Keyword::True) || token.is_keyword(Keyword::False) =>
            {
                self.accept();
                Some(Expression::Boolean {
                    value: token.is_keyword(Keyword::True),
                    range: self.end_range(start),
                })
            }

            TokenKind::Identifier => match self.lookahead(1).kind {
                TokenKind::ParenLeft => self.parse_call(),
                TokenKind::BracketLeft => self.parse_index(),
                TokenKind::Increment | TokenKind::Decrement => self.parse_postfix(),
                _ => {
                    self.accept();
                    Some(Expression::Identifier(self.identifier(&token)))
                }
            },

            _ => {
                let found = self.describe(&token);
                self.error(format!("unrecognized expression: {found}"));
                None
            }
        }
    }

    /// `name(arg, ...)`
    fn parse_call(&mut self) -> Option<Expression> {
        let start = self.begin_range();
        let token = self.accept();
        let target = Expression::Identifier(self.identifier(&token));
        self.accept(); // consume '('

        let mut arguments = Vec::new();
        if !self.match_token(TokenKind::ParenRight) {
            loop {
                if let Some(argument) = self.parse_expression() {
                    arguments.push(argument);
                }
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::ParenRight, "after arguments");
        }

        Some(Expression::Call {
            target: Box::new(target),
            arguments,
            range: self.end_range(start),
        })
    }

    /// `name[index]` with an optional `$` or `!` sigil after `]`
    fn parse_index(&mut self) -> Option<Expression> {
        let start = self.begin_range();
        let token = self.accept();
        let symbol = self.identifier(&token);
        self.accept(); // consume '['

        let index = if self.check(TokenKind::BracketRight) {
            None
        } else {
            self.parse_expression().map(Box::new)
        };
        self.expect(TokenKind::BracketRight, "to close array index")?;

        if !self.match_token(TokenKind::Dollar) {
            self.match_token(TokenKind::Not);
        }

        Some(Expression::Index {
            symbol,
            index,
            range: self.end_range(start),
        })
    }

    /// `name++` / `name--`
    fn parse_postfix(&mut self) -> Option<Expression> {
        let start = self.begin_range();
        let token = self.accept();
        let operand = self.identifier(&token);

        let op = match self.accept().kind {
            TokenKind::Increment => PostfixOp::Increment,
            _ => PostfixOp::Decrement,
        };

        Some(Expression::Postfix {
            op,
            operand,
            range: self.end_range(start),
        })
    }
}

/// Contents of a string literal; the closing quote may be missing.
fn string_value(lexeme: &str) -> &str {
    let inner = lexeme.strip_prefix('"').unwrap_or(lexeme);
    inner.strip_suffix('"').unwrap_or(inner)
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::AssignPlus => AssignOp::Add,
        TokenKind::AssignMinus => AssignOp::Subtract,
        TokenKind::AssignMultiply => AssignOp::Multiply,
        TokenKind::AssignDivide => AssignOp::Divide,
        TokenKind::AssignModulus => AssignOp::Modulus,
        TokenKind::AssignPow => AssignOp::Pow,
        TokenKind::AssignShiftLeft => AssignOp::ShiftLeft,
        TokenKind::AssignShiftRight => AssignOp::ShiftRight,
        TokenKind::AssignAnd => AssignOp::And,
        TokenKind::AssignOr => AssignOp::Or,
        TokenKind::AssignXor => AssignOp::Xor,
        _ => return None,
    })
}

fn logical_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::AndLogical => Some(BinaryOp::Logical(LogicalOp::And)),
        TokenKind::OrLogical => Some(BinaryOp::Logical(LogicalOp::Or)),
        _ => None,
    }
}

fn bitwise_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::AndBinary => Some(BinaryOp::Bitwise(BitwiseOp::And)),
        TokenKind::OrBinary => Some(BinaryOp::Bitwise(BitwiseOp::Or)),
        TokenKind::Xor => Some(BinaryOp::Bitwise(BitwiseOp::Xor)),
        _ => None,
    }
}

fn relational_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::GreaterThan => RelationalOp::Gt,
        TokenKind::GreaterThanOrEqual => RelationalOp::Gte,
        TokenKind::LessThan => RelationalOp::Lt,
        TokenKind::LessThanOrEqual => RelationalOp::Lte,
        TokenKind::Equals => RelationalOp::Eq,
        TokenKind::NotEquals => RelationalOp::Neq,
        _ => return None,
    };
    Some(BinaryOp::Relational(op))
}

fn shift_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::ShiftLeft => Some(BinaryOp::Shift(ShiftOp::Left)),
        TokenKind::ShiftRight => Some(BinaryOp::Shift(ShiftOp::Right)),
        _ => None,
    }
}

fn additive_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Additive(AdditiveOp::Add)),
        TokenKind::Minus => Some(BinaryOp::Additive(AdditiveOp::Subtract)),
        _ => None,
    }
}

fn multiplicative_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Multiply => MultiplicativeOp::Multiply,
        TokenKind::Divide => MultiplicativeOp::Divide,
        TokenKind::DivideInt => MultiplicativeOp::DivideInt,
        TokenKind::Modulus => MultiplicativeOp::Modulus,
        TokenKind::Pow => MultiplicativeOp::Power,
        _ => return None,
    };
    Some(BinaryOp::Multiplicative(op))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(source: &str) -> Expression {
        let mut parser = Parser::new(source);
        let expr = parser.parse_expression().expect("expression");
        assert!(parser.errors().is_empty(), "unexpected errors: {:?}", parser.errors());
        expr
    }

    /// Render an expression fully parenthesized.
    fn show(expr: &Expression) -> String {
        match expr {
            Expression::Identifier(ident) => ident.name.clone(),
            Expression::Boolean { value, .. } => value.to_string(),
            Expression::Number { value, .. } => value.to_string(),
            Expression::String { value, .. } => format!("{:?}", value),
            Expression::Unary { op, operand, .. } => {
                let sign = if *op == UnaryOp::Negative { "-" } else { "+" };
                format!("({}{})", sign, show(operand))
            }
            Expression::Binary {
                op, left, right, ..
            } => format!("({} {:?} {})", show(left), op, show(right)),
            Expression::Assignment {
                op, symbol, value, ..
            } => format!("({} {:?}= {})", show(symbol), op, show(value)),
            Expression::Call {
                target, arguments, ..
            } => {
                let args: Vec<_> = arguments.iter().map(show).collect();
                format!("{}({})", show(target), args.join(", "))
            }
            Expression::Index { symbol, index, .. } => match index {
                Some(index) => format!("{}[{}]", symbol.name, show(index)),
                None => format!("{}[]", symbol.name),
            },
            Expression::Postfix { op, operand, .. } => format!("{}{:?}", operand.name, op),
        }
    }

    #[test]
    fn test_multiplicative_binds_tighter() {
        let expr = parse_expr("1 + 2 * 3");
        match &expr {
            Expression::Binary {
                op: BinaryOp::Additive(AdditiveOp::Add),
                left,
                right,
                ..
            } => {
                assert!(matches!(**left, Expression::Number { value, .. } if value == 1.0));
                assert!(matches!(
                    **right,
                    Expression::Binary {
                        op: BinaryOp::Multiplicative(MultiplicativeOp::Multiply),
                        ..
                    }
                ));
            }
            other => panic!("Expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_levels_are_right_associative() {
        assert_eq!(
            show(&parse_expr("1 - 2 - 3")),
            "(1 Additive(Subtract) (2 Additive(Subtract) 3))"
        );
        assert_eq!(show(&parse_expr("a = b = 3")), "(a Assign= (b Assign= 3))");
    }

    #[test]
    fn test_precedence_ladder() {
        assert_eq!(
            show(&parse_expr("a || b & c == d << e + f * -g")),
            "(a Logical(Or) (b Bitwise(And) (c Relational(Eq) (d Shift(Left) \
             (e Additive(Add) (f Multiplicative(Multiply) (-g)))))))"
        );
    }

    #[test]
    fn test_word_operators_and_not_equals() {
        assert_eq!(
            show(&parse_expr("x and y <> z")),
            "(x Logical(And) (y Relational(Neq) z))"
        );
        assert_eq!(
            show(&parse_expr("n \\ 2 ^ 3 % 4")),
            "(n Multiplicative(DivideInt) (2 Multiplicative(Power) (3 Multiplicative(Modulus) 4)))"
        );
    }

    #[test]
    fn test_calls_and_indexes() {
        assert_eq!(
            show(&parse_expr("mwin(\"Hi\", #x, arr[i + 1]$)")),
            "mwin(\"Hi\", #x, arr[(i Additive(Add) 1)])"
        );
        assert_eq!(show(&parse_expr("f()")), "f()");
        assert_eq!(show(&parse_expr("list[]")), "list[]");
        assert_eq!(show(&parse_expr("count++ ")), "countIncrement");
        assert_eq!(show(&parse_expr("(true)")), "true");
    }

    #[test]
    fn test_compound_assignment() {
        assert_eq!(show(&parse_expr("x ^= 2")), "(x Pow= 2)");
        assert_eq!(show(&parse_expr("x `= 1")), "(x Xor= 1)");
        assert_eq!(show(&parse_expr("x <<= 1")), "(x ShiftLeft= 1)");
    }

    #[test]
    fn test_ranges() {
        let expr = parse_expr("  foo(1, 2) ");
        assert_eq!(expr.range().start.offset, 2);
        assert_eq!(expr.range().end.offset, 11);

        let expr = parse_expr("\"a\nbc\"");
        assert_eq!(expr.range().end.line, 2);
        assert_eq!(expr.range().end.column, 4);
    }

    #[test]
    fn test_parentheses_are_part_of_range() {
        let expr = parse_expr("x = (1 + 2)");
        match &expr {
            Expression::Assignment { value, .. } => {
                assert_eq!(value.range().start.offset, 4);
                assert_eq!(value.range().end.offset, 11);
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
        assert_eq!(expr.range().end.offset, 11);
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let source = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(show(&parse_expr(&source)), "x");

        let chain = vec!["1"; 200].join(" + ");
        parse_expr(&chain);
    }

    #[test]
    fn test_deep_parentheses_are_reported() {
        let source = format!("x = {}1", "(".repeat(10_000));
        let mut parser = Parser::new(&source);
        parser.parse();
        assert!(parser
            .errors()
            .iter()
            .any(|e| e.message == "expression nested too deeply"));
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn test_long_operator_chain_is_reported() {
        let source = format!("x = {}", vec!["1"; 10_000].join(" + "));
        let mut parser = Parser::new(&source);
        parser.parse();
        assert!(parser
            .errors()
            .iter()
            .any(|e| e.message == "expression nested too deeply"));
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn test_string_value() {
        assert_eq!(string_value("\"abc\""), "abc");
        assert_eq!(string_value("\"abc"), "abc");
        assert_eq!(string_value("\""), "");
    }

    #[test]
    fn test_unrecognized_expression() {
        let mut parser = Parser::new("1 + )");
        assert!(parser.parse_expression().is_none());
        assert_eq!(parser.errors().len(), 1);
        assert_eq!(parser.errors()[0].column, 5);
        assert!(parser.errors()[0].message.starts_with("unrecognized expression"));
    }
}
