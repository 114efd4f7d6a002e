//! Syntax tree of the host script language.
//!
//! The tree is a closed set of variants so every consumer matches on node
//! kinds exhaustively. Each node carries the [`Span`] it was parsed from.

pub mod operators;
pub mod visit;

pub use self::operators::BinaryOp;

use serde::{Deserialize, Serialize};

/// A 1-based source position.
///
/// Spans never take part in structural equality: two trees parsed from
/// differently laid out text compare equal when their shapes match.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl PartialEq for Span {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Span {}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Literal constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    /// Decimal literal kept as written, so `1.0` prints back as `1.0`.
    Decimal(String),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// `name`
    Variable(String),
    Constant(Literal),
    /// `object.property`
    Property { object: Box<Expr>, property: String },
    /// `method(args)` or `object.method(args)`; a trailing closure is the last argument.
    Call {
        object: Option<Box<Expr>>,
        method: String,
        args: Vec<Expr>,
    },
    /// `new Type(args)`
    Constructor { ty: String, args: Vec<Expr> },
    /// `expr as Type`
    Cast { expr: Box<Expr>, ty: String },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// `!expr`
    Not(Box<Expr>),
    /// `-expr`
    Negate(Box<Expr>),
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `*expr` inside a list or argument list
    Spread(Box<Expr>),
    Closure(Closure),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Variable(name.into()), span)
    }

    /// The name of a bare variable reference.
    pub fn as_variable(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// `(method, args)` of a call without a receiver.
    pub fn as_implicit_call(&self) -> Option<(&str, &[Expr])> {
        match &self.kind {
            ExprKind::Call {
                object: None,
                method,
                args,
            } => Some((method, args)),
            _ => None,
        }
    }
}

/// A closure literal: `{ a, b -> statements }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Closure {
    pub params: Vec<String>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Stmt>, span: Span) -> Self {
        Self { statements, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Expr(Expr),
    /// `def name = init` or `Type name = init`
    Declare {
        ty: Option<String>,
        name: String,
        init: Option<Expr>,
    },
    If {
        cond: Expr,
        then: Block,
        otherwise: Option<Block>,
    },
    Return(Option<Expr>),
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The expression of an expression statement.
    pub fn as_expr(&self) -> Option<&Expr> {
        match &self.kind {
            StmtKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    pub modifiers: Vec<String>,
    pub ty: Option<String>,
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodNode {
    pub modifiers: Vec<String>,
    pub return_ty: Option<String>,
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    pub modifiers: Vec<String>,
    pub name: String,
    pub superclass: Option<String>,
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
    pub span: Span,
}

/// Top-level entries of a source file, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Class(ClassNode),
    Method(MethodNode),
    /// Script statement; together these form the implicit script body.
    Statement(Stmt),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    pub items: Vec<Item>,
}

impl Module {
    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(class) => Some(class),
            _ => None,
        })
    }
}
