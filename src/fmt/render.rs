//! Expression rendering.
//!
//! Parentheses are only emitted where precedence requires them, so a
//! rendered expression parses back to the tree it came from.

use std::fmt::{Result, Write};

use super::Formatter;
use crate::ast::{BinaryOp, Closure, Expr, ExprKind, Literal};

const ASSIGNMENT: u8 = 1;
const UNARY: u8 = 9;
/// `as` swallows a following `.name` into the type, so a cast is never a member receiver.
const CAST: u8 = 10;
const POSTFIX: u8 = 11;
const PRIMARY: u8 = 12;

fn op_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Assign | BinaryOp::PlusAssign | BinaryOp::MinusAssign => ASSIGNMENT,
        BinaryOp::Or => 2,
        BinaryOp::And => 3,
        BinaryOp::Eq | BinaryOp::Ne => 4,
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::In
        | BinaryOp::InstanceOf => 5,
        BinaryOp::LeftShift => 6,
        BinaryOp::Add | BinaryOp::Sub => 7,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 8,
        BinaryOp::Index => POSTFIX,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Binary { op, .. } => op_precedence(*op),
        ExprKind::Not(_) | ExprKind::Negate(_) | ExprKind::Spread(_) => UNARY,
        ExprKind::Constant(Literal::Int(n)) if *n < 0 => UNARY,
        ExprKind::Constant(Literal::Decimal(text)) if text.starts_with('-') => UNARY,
        ExprKind::Cast { .. } => CAST,
        ExprKind::Property { .. } => POSTFIX,
        ExprKind::Call {
            object: Some(_), ..
        } => POSTFIX,
        _ => PRIMARY,
    }
}

/// Quote `value` as a double quoted string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a value expression as source text.
pub fn render_expr(expr: &Expr) -> String {
    let mut formatter = Formatter::new();
    match formatter.visit_expr(expr) {
        Ok(()) => formatter.buffer,
        Err(_) => String::new(),
    }
}

impl Formatter {
    pub(super) fn visit_expr(&mut self, expr: &Expr) -> Result {
        match &expr.kind {
            ExprKind::Variable(name) => write!(self.buffer, "{}", name),
            ExprKind::Constant(literal) => self.visit_literal(literal),
            ExprKind::Property { object, property } => {
                self.operand(object, POSTFIX)?;
                write!(self.buffer, ".{}", property)
            }
            ExprKind::Call {
                object,
                method,
                args,
            } => {
                if let Some(object) = object {
                    self.operand(object, POSTFIX)?;
                    write!(self.buffer, ".")?;
                }
                write!(self.buffer, "{}", method)?;
                self.visit_call_args(args)
            }
            ExprKind::Constructor { ty, args } => {
                write!(self.buffer, "new {}(", ty)?;
                self.visit_list(args)?;
                write!(self.buffer, ")")
            }
            ExprKind::Cast { expr, ty } => {
                self.operand(expr, CAST)?;
                write!(self.buffer, " as {}", ty)
            }
            ExprKind::Binary {
                left,
                op: BinaryOp::Index,
                right,
            } => {
                self.operand(left, POSTFIX)?;
                write!(self.buffer, "[")?;
                self.visit_expr(right)?;
                write!(self.buffer, "]")
            }
            ExprKind::Binary { left, op, right } => {
                let level = op_precedence(*op);
                let (left_min, right_min) = if op.is_assignment() {
                    (level + 1, level)
                } else {
                    (level, level + 1)
                };
                self.operand(left, left_min)?;
                write!(self.buffer, " {} ", op.token())?;
                self.operand(right, right_min)
            }
            ExprKind::Not(inner) => {
                write!(self.buffer, "!")?;
                self.operand(inner, UNARY)
            }
            ExprKind::Negate(inner) => {
                write!(self.buffer, "-")?;
                self.operand(inner, UNARY)
            }
            ExprKind::List(items) => {
                write!(self.buffer, "[")?;
                self.visit_list(items)?;
                write!(self.buffer, "]")
            }
            ExprKind::Spread(inner) => {
                write!(self.buffer, "*")?;
                self.operand(inner, UNARY)
            }
            ExprKind::Closure(closure) => self.visit_closure(closure),
        }
    }

    /// Render `expr`, parenthesized when it binds looser than `min`.
    fn operand(&mut self, expr: &Expr, min: u8) -> Result {
        if precedence(expr) < min {
            write!(self.buffer, "(")?;
            self.visit_expr(expr)?;
            write!(self.buffer, ")")
        } else {
            self.visit_expr(expr)
        }
    }

    fn visit_literal(&mut self, literal: &Literal) -> Result {
        match literal {
            Literal::Null => write!(self.buffer, "null"),
            Literal::Bool(value) => write!(self.buffer, "{}", value),
            Literal::Int(value) => write!(self.buffer, "{}", value),
            Literal::Decimal(text) => write!(self.buffer, "{}", text),
            Literal::String(value) => write!(self.buffer, "{}", quote(value)),
        }
    }

    fn visit_list(&mut self, items: &[Expr]) -> Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(self.buffer, ", ")?;
            }
            self.visit_expr(item)?;
        }
        Ok(())
    }

    /// `(args)`, with a closure in last position moved after the parentheses.
    fn visit_call_args(&mut self, args: &[Expr]) -> Result {
        match args.split_last() {
            Some((
                Expr {
                    kind: ExprKind::Closure(closure),
                    ..
                },
                rest,
            )) => {
                if !rest.is_empty() {
                    write!(self.buffer, "(")?;
                    self.visit_list(rest)?;
                    write!(self.buffer, ")")?;
                }
                write!(self.buffer, " ")?;
                self.visit_closure(closure)
            }
            _ => {
                write!(self.buffer, "(")?;
                self.visit_list(args)?;
                write!(self.buffer, ")")
            }
        }
    }

    fn visit_closure(&mut self, closure: &Closure) -> Result {
        write!(self.buffer, "{{")?;
        if !closure.params.is_empty() {
            write!(self.buffer, " {} ->", closure.params.join(", "))?;
        }
        if closure.body.statements.is_empty() {
            return write!(self.buffer, " }}");
        }
        writeln!(self.buffer)?;
        self.nested(&closure.body)?;
        self.indent()?;
        write!(self.buffer, "}}")
    }
}
