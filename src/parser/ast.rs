// AST (Abstract Syntax Tree) definitions for RPGCode

use super::lexer::ScanContext;

/// A position in the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Byte offset
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl From<&ScanContext> for SourceLocation {
    fn from(ctx: &ScanContext) -> Self {
        SourceLocation::new(ctx.offset, ctx.line, ctx.column)
    }
}

/// Start and end positions of a node; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `location`.
    pub fn empty(location: SourceLocation) -> Self {
        Self::new(location, location)
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Visibility of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

/// A name as written in the source, sigils included (`#mwin`, `name$`).
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub range: SourceRange,
}

impl Identifier {
    pub fn new(name: impl Into<String>, range: SourceRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub range: SourceRange,
}

/// Function or method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    /// `None` for abstract declarations (`function f() = 0`)
    pub body: Option<Block>,
    pub is_inline: bool,
    pub is_abstract: bool,
    pub visibility: Visibility,
    pub range: SourceRange,
}

/// Class field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFieldDeclaration {
    pub name: Identifier,
    pub visibility: Visibility,
    pub range: SourceRange,
}

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub name: Identifier,
    /// Base classes listed after `:`
    pub inheritance: Vec<Identifier>,
    pub functions: Vec<FunctionDeclaration>,
    pub fields: Vec<ClassFieldDeclaration>,
    pub range: SourceRange,
}

/// Root node for one parsed source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompilationUnit {
    pub classes: Vec<ClassDeclaration>,
    pub functions: Vec<FunctionDeclaration>,
    /// Statements written outside any function body
    pub statements: Vec<Statement>,
    pub range: SourceRange,
}

impl CompilationUnit {
    pub fn new() -> Self {
        CompilationUnit::default()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.functions.iter().find(|f| f.name.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassDeclaration> {
        self.classes.iter().find(|c| c.name.name == name)
    }
}

/// `{ ... }` statement list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    Do,
    While,
    Until,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControlKind {
    Break,
    Continue,
    Goto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHandlerKind {
    /// `on error resume next`
    ResumeNext,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression {
        expression: Expression,
        range: SourceRange,
    },
    Return {
        value: Option<Expression>,
        range: SourceRange,
    },
    /// `if`; `elseif`/`else` branches are consumed by the parser but not kept
    Conditional {
        condition: Expression,
        body: Block,
        range: SourceRange,
    },
    Loop {
        kind: LoopKind,
        condition: Expression,
        body: Block,
        range: SourceRange,
    },
    ForLoop {
        initializer: Option<Expression>,
        condition: Option<Expression>,
        iterator: Option<Expression>,
        body: Block,
        range: SourceRange,
    },
    FlowControl {
        kind: FlowControlKind,
        /// Label named by `goto`
        target: Option<Identifier>,
        range: SourceRange,
    },
    Label {
        name: Identifier,
        range: SourceRange,
    },
    ErrorHandler {
        kind: ErrorHandlerKind,
        range: SourceRange,
    },
}

impl Statement {
    /// Get the source range of this statement
    pub fn range(&self) -> SourceRange {
        match self {
            Statement::Expression { range, .. }
            | Statement::Return { range, .. }
            | Statement::Conditional { range, .. }
            | Statement::Loop { range, .. }
            | Statement::ForLoop { range, .. }
            | Statement::FlowControl { range, .. }
            | Statement::Label { range, .. }
            | Statement::ErrorHandler { range, .. } => *range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditiveOp {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplicativeOp {
    Multiply,
    Divide,
    DivideInt,
    Modulus,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

/// Binary operators, grouped by precedence family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Additive(AdditiveOp),
    Multiplicative(MultiplicativeOp),
    Shift(ShiftOp),
    Relational(RelationalOp),
    Logical(LogicalOp),
    Bitwise(BitwiseOp),
}

/// Assignment operators (`=` and the compound forms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Pow,
    ShiftLeft,
    ShiftRight,
    And,
    Or,
    Xor,
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Boolean {
        value: bool,
        range: SourceRange,
    },
    Number {
        value: f64,
        range: SourceRange,
    },
    String {
        value: String,
        range: SourceRange,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        range: SourceRange,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        range: SourceRange,
    },
    Assignment {
        op: AssignOp,
        symbol: Box<Expression>,
        value: Box<Expression>,
        range: SourceRange,
    },
    Call {
        target: Box<Expression>,
        arguments: Vec<Expression>,
        range: SourceRange,
    },
    Index {
        symbol: Identifier,
        index: Option<Box<Expression>>,
        range: SourceRange,
    },
    Postfix {
        op: PostfixOp,
        operand: Identifier,
        range: SourceRange,
    },
}

impl Expression {
    /// Get the source range of this expression
    pub fn range(&self) -> SourceRange {
        match self {
            Expression::Identifier(ident) => ident.range,
            Expression::Boolean { range, .. }
            | Expression::Number { range, .. }
            | Expression::String { range, .. }
            | Expression::Unary { range, .. }
            | Expression::Binary { range, .. }
            | Expression::Assignment { range, .. }
            | Expression::Call { range, .. }
            | Expression::Index { range, .. }
            | Expression::Postfix { range, .. } => *range,
        }
    }

    /// Replace the source range, e.g. to cover enclosing parentheses.
    pub fn set_range(&mut self, new_range: SourceRange) {
        match self {
            Expression::Identifier(ident) => ident.range = new_range,
            Expression::Boolean { range, .. }
            | Expression::Number { range, .. }
            | Expression::String { range, .. }
            | Expression::Unary { range, .. }
            | Expression::Binary { range, .. }
            | Expression::Assignment { range, .. }
            | Expression::Call { range, .. }
            | Expression::Index { range, .. }
            | Expression::Postfix { range, .. } => *range = new_range,
        }
    }
}
