//! Expression grammar, lowest precedence first:
//! assignment, `||`, `&&`, equality, relational (`in`, `instanceof`),
//! `<<`, additive, multiplicative, unary, postfix, primary.
//!
//! Operators must start on the same line as their left operand; a newline
//! ends the expression.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, one_of},
    combinator::{not, opt, value},
    multi::{separated_list0, separated_list1},
    sequence::{pair, terminated, tuple},
};

use super::Grammar;
use super::tokens::*;
use crate::ast::{BinaryOp, Block, Closure, Expr, ExprKind, Literal};

type Level<'a> = fn(&Grammar<'a>, &'a str) -> PResult<'a, Expr>;
type OpParser<'a> = fn(&'a str) -> PResult<'a, BinaryOp>;

fn assign_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::PlusAssign, tag("+=")),
        value(BinaryOp::MinusAssign, tag("-=")),
        value(BinaryOp::Assign, terminated(char('='), not(char('=')))),
    ))(input)
}

fn or_op(input: &str) -> PResult<'_, BinaryOp> {
    value(BinaryOp::Or, tag("||"))(input)
}

fn and_op(input: &str) -> PResult<'_, BinaryOp> {
    value(BinaryOp::And, tag("&&"))(input)
}

fn equality_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::Eq, tag("==")),
        value(BinaryOp::Ne, tag("!=")),
    ))(input)
}

fn relational_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::Le, tag("<=")),
        value(BinaryOp::Ge, tag(">=")),
        value(BinaryOp::Lt, terminated(char('<'), not(char('<')))),
        value(BinaryOp::Gt, char('>')),
        value(BinaryOp::InstanceOf, keyword("instanceof")),
        value(BinaryOp::In, keyword("in")),
    ))(input)
}

fn shift_op(input: &str) -> PResult<'_, BinaryOp> {
    value(BinaryOp::LeftShift, terminated(tag("<<"), not(char('='))))(input)
}

fn additive_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::Add, terminated(char('+'), not(one_of("+=")))),
        value(BinaryOp::Sub, terminated(char('-'), not(one_of("-=>")))),
    ))(input)
}

fn multiplicative_op(input: &str) -> PResult<'_, BinaryOp> {
    alt((
        value(BinaryOp::Mul, terminated(char('*'), not(char('=')))),
        value(BinaryOp::Div, terminated(char('/'), not(one_of("/*=")))),
        value(BinaryOp::Rem, terminated(char('%'), not(char('=')))),
    ))(input)
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    let span = left.span;
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

impl<'a> Grammar<'a> {
    pub fn expr(&self, input: &'a str) -> PResult<'a, Expr> {
        self.assignment(input)
    }

    /// Right-associative `=`, `+=`, `-=`.
    fn assignment(&self, input: &'a str) -> PResult<'a, Expr> {
        let (input, left) = self.or_expr(input)?;
        let (after, _) = hs(input)?;
        match assign_op(after) {
            Ok((rest, op)) => {
                let (rest, _) = ws(rest)?;
                let (rest, right) = self.assignment(rest)?;
                Ok((rest, binary(left, op, right)))
            }
            Err(nom::Err::Error(_)) => Ok((input, left)),
            Err(e) => Err(e),
        }
    }

    /// One left-associative precedence level.
    fn left_assoc(&self, input: &'a str, next: Level<'a>, op: OpParser<'a>) -> PResult<'a, Expr> {
        let (mut input, mut left) = next(self, input)?;
        loop {
            let (after, _) = hs(input)?;
            match op(after) {
                Ok((rest, operator)) => {
                    let (rest, _) = ws(rest)?;
                    let (rest, right) = next(self, rest)?;
                    left = binary(left, operator, right);
                    input = rest;
                }
                Err(nom::Err::Error(_)) => return Ok((input, left)),
                Err(e) => return Err(e),
            }
        }
    }

    fn or_expr(&self, input: &'a str) -> PResult<'a, Expr> {
        self.left_assoc(input, Self::and_expr, or_op)
    }

    fn and_expr(&self, input: &'a str) -> PResult<'a, Expr> {
        self.left_assoc(input, Self::equality, and_op)
    }

    fn equality(&self, input: &'a str) -> PResult<'a, Expr> {
        self.left_assoc(input, Self::relational, equality_op)
    }

    fn relational(&self, input: &'a str) -> PResult<'a, Expr> {
        self.left_assoc(input, Self::shift, relational_op)
    }

    fn shift(&self, input: &'a str) -> PResult<'a, Expr> {
        self.left_assoc(input, Self::additive, shift_op)
    }

    fn additive(&self, input: &'a str) -> PResult<'a, Expr> {
        self.left_assoc(input, Self::multiplicative, additive_op)
    }

    fn multiplicative(&self, input: &'a str) -> PResult<'a, Expr> {
        self.left_assoc(input, Self::unary, multiplicative_op)
    }

    fn unary(&self, input: &'a str) -> PResult<'a, Expr> {
        let span = self.span(input);
        if let Some(rest) = input.strip_prefix('!') {
            let (rest, _) = ws(rest)?;
            let (rest, operand) = self.unary(rest)?;
            return Ok((rest, Expr::new(ExprKind::Not(Box::new(operand)), span)));
        }
        if let Some(rest) = input.strip_prefix('-') {
            let (rest, operand) = self.unary(rest)?;
            let kind = match operand.kind {
                ExprKind::Constant(Literal::Int(n)) => ExprKind::Constant(Literal::Int(-n)),
                ExprKind::Constant(Literal::Decimal(text)) => {
                    ExprKind::Constant(Literal::Decimal(format!("-{}", text)))
                }
                other => ExprKind::Negate(Box::new(Expr::new(other, operand.span))),
            };
            return Ok((rest, Expr::new(kind, span)));
        }
        self.postfix(input)
    }

    /// Member access, calls, indexing and `as` casts.
    fn postfix(&self, input: &'a str) -> PResult<'a, Expr> {
        let (mut input, mut expr) = self.primary(input)?;
        loop {
            if let Ok((rest, _)) = self.member_dot(input) {
                let (rest, member) = identifier(rest)?;
                let span = expr.span;
                match self.call_args(rest)? {
                    (rest, Some(args)) => {
                        expr = Expr::new(
                            ExprKind::Call {
                                object: Some(Box::new(expr)),
                                method: member.to_string(),
                                args,
                            },
                            span,
                        );
                        input = rest;
                    }
                    (rest, None) => {
                        expr = Expr::new(
                            ExprKind::Property {
                                object: Box::new(expr),
                                property: member.to_string(),
                            },
                            span,
                        );
                        input = rest;
                    }
                }
                continue;
            }
            if let Some(rest) = input.strip_prefix('[') {
                let (rest, _) = ws(rest)?;
                let (rest, index) = self.expr(rest)?;
                let (rest, _) = ws(rest)?;
                let (rest, _) = char(']')(rest)?;
                expr = binary(expr, BinaryOp::Index, index);
                input = rest;
                continue;
            }
            if let Ok((rest, _)) = tuple((hs, keyword("as"), hs))(input) {
                let (rest, ty) = qualified_name(rest)?;
                let span = expr.span;
                expr = Expr::new(
                    ExprKind::Cast {
                        expr: Box::new(expr),
                        ty: ty.to_string(),
                    },
                    span,
                );
                input = rest;
                continue;
            }
            return Ok((input, expr));
        }
    }

    /// `.` possibly on the next line, but never a `..` range.
    fn member_dot(&self, input: &'a str) -> PResult<'a, ()> {
        let (rest, _) = ws(input)?;
        let (rest, _) = terminated(char('.'), not(char('.')))(rest)?;
        let (rest, _) = hs(rest)?;
        Ok((rest, ()))
    }

    fn primary(&self, input: &'a str) -> PResult<'a, Expr> {
        let span = self.span(input);
        alt((
            |i| self.parenthesized(i),
            |i| self.list(i),
            |i| {
                self.closure(i)
                    .map(|(rest, c)| (rest, Expr::new(ExprKind::Closure(c), span)))
            },
            |i| {
                string_literal(i).map(|(rest, s)| {
                    (rest, Expr::new(ExprKind::Constant(Literal::String(s)), span))
                })
            },
            |i| number(i).map(|(rest, n)| (rest, Expr::new(ExprKind::Constant(n), span))),
            |i| word_literal(i).map(|(rest, w)| (rest, Expr::new(ExprKind::Constant(w), span))),
            |i| self.constructor(i),
            |i| self.name_or_call(i),
        ))(input)
    }

    fn parenthesized(&self, input: &'a str) -> PResult<'a, Expr> {
        let (input, _) = pair(char('('), ws)(input)?;
        let (input, inner) = self.expr(input)?;
        let (input, _) = pair(ws, char(')'))(input)?;
        Ok((input, inner))
    }

    fn list(&self, input: &'a str) -> PResult<'a, Expr> {
        let span = self.span(input);
        let (input, _) = pair(char('['), ws)(input)?;
        let (input, items) =
            separated_list0(tuple((ws, char(','), ws)), |i| self.argument(i))(input)?;
        let (input, _) = tuple((ws, opt(char(',')), ws, char(']')))(input)?;
        Ok((input, Expr::new(ExprKind::List(items), span)))
    }

    /// `new a.b.Type(args)`
    fn constructor(&self, input: &'a str) -> PResult<'a, Expr> {
        let span = self.span(input);
        let (input, _) = pair(keyword("new"), hs1)(input)?;
        let (input, ty) = qualified_name(input)?;
        let (input, _) = hs(input)?;
        let (input, args) = self.paren_args(input)?;
        Ok((
            input,
            Expr::new(
                ExprKind::Constructor {
                    ty: ty.to_string(),
                    args,
                },
                span,
            ),
        ))
    }

    fn name_or_call(&self, input: &'a str) -> PResult<'a, Expr> {
        let span = self.span(input);
        let (input, ident) = name(input)?;
        match self.call_args(input)? {
            (rest, Some(args)) => Ok((
                rest,
                Expr::new(
                    ExprKind::Call {
                        object: None,
                        method: ident.to_string(),
                        args,
                    },
                    span,
                ),
            )),
            (rest, None) => Ok((rest, Expr::variable(ident, span))),
        }
    }

    /// Optional `(args)` followed by an optional trailing closure.
    fn call_args(&self, input: &'a str) -> PResult<'a, Option<Vec<Expr>>> {
        let (input, args) = match hs(input).and_then(|(rest, _)| self.paren_args(rest)) {
            Ok((rest, args)) => (rest, Some(args)),
            Err(nom::Err::Error(_)) => (input, None),
            Err(e) => return Err(e),
        };
        let span = self.span(hs(input).map(|(rest, _)| rest).unwrap_or(input));
        match hs(input).and_then(|(rest, _)| self.closure(rest)) {
            Ok((rest, closure)) => {
                let mut args = args.unwrap_or_default();
                args.push(Expr::new(ExprKind::Closure(closure), span));
                Ok((rest, Some(args)))
            }
            Err(nom::Err::Error(_)) => Ok((input, args)),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn paren_args(&self, input: &'a str) -> PResult<'a, Vec<Expr>> {
        let (input, _) = pair(char('('), ws)(input)?;
        let (input, args) =
            separated_list0(tuple((ws, char(','), ws)), |i| self.argument(i))(input)?;
        let (input, _) = pair(ws, char(')'))(input)?;
        Ok((input, args))
    }

    /// An argument or list element; `*expr` spreads.
    pub(crate) fn argument(&self, input: &'a str) -> PResult<'a, Expr> {
        let span = self.span(input);
        if let Some(rest) = input.strip_prefix('*') {
            let (rest, inner) = self.expr(rest)?;
            return Ok((rest, Expr::new(ExprKind::Spread(Box::new(inner)), span)));
        }
        self.expr(input)
    }

    /// Comma separated paren-less arguments; commas may end a line.
    pub(crate) fn command_args(&self, input: &'a str) -> PResult<'a, Vec<Expr>> {
        separated_list1(tuple((hs, char(','), ws)), |i| self.argument(i))(input)
    }

    /// `{ a, b -> statements }`
    pub(crate) fn closure(&self, input: &'a str) -> PResult<'a, Closure> {
        let span = self.span(input);
        let (input, _) = char('{')(input)?;
        let (input, _) = ws(input)?;
        let (input, params) = match self.closure_params(input) {
            Ok((rest, params)) => (rest, params),
            Err(nom::Err::Error(_)) => (input, Vec::new()),
            Err(e) => return Err(e),
        };
        let (input, statements) = self.statements(input)?;
        let (input, _) = pair(ws, char('}'))(input)?;
        Ok((
            input,
            Closure {
                params,
                body: Block::new(statements, span),
            },
        ))
    }

    fn closure_params(&self, input: &'a str) -> PResult<'a, Vec<String>> {
        let (input, names) = separated_list0(tuple((hs, char(','), hs)), name)(input)?;
        let (input, _) = tuple((hs, tag("->"), ws))(input)?;
        Ok((input, names.into_iter().map(str::to_string).collect()))
    }
}
