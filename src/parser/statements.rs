//! Statements, declarations and top-level items.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{not, opt, recognize},
    multi::{many0, separated_list0},
    sequence::{pair, terminated, tuple},
};

use super::Grammar;
use super::tokens::*;
use crate::ast::{
    Block, ClassNode, Expr, ExprKind, FieldNode, Item, MethodNode, Module, Stmt, StmtKind,
};

enum Member {
    Field(FieldNode),
    Method(MethodNode),
}

fn failure(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Verify))
}

/// After a statement only a newline, `;`, `}` or the end of input may follow.
fn statement_end(input: &str) -> PResult<'_, ()> {
    let (rest, _) = hs(input)?;
    match rest.chars().next() {
        None | Some('\n') | Some(';') | Some('}') => Ok((rest, ())),
        Some(_) => Err(failure(rest)),
    }
}

/// A parameter or declaration type: `def`, `String`, `String[]`, `int`.
fn declared_type(input: &str) -> PResult<'_, Option<&str>> {
    alt((
        |i| keyword("def")(i).map(|(rest, _)| (rest, None)),
        |i| recognize(pair(type_name, opt(tag("[]"))))(i).map(|(rest, ty)| (rest, Some(ty))),
    ))(input)
}

fn modifiers(input: &str) -> PResult<'_, Vec<String>> {
    let (input, mods) = many0(terminated(modifier, hs1))(input)?;
    Ok((input, mods.into_iter().map(str::to_string).collect()))
}

fn param(input: &str) -> PResult<'_, &str> {
    let (input, _) = opt(terminated(declared_type, hs1))(input)?;
    name(input)
}

fn params(input: &str) -> PResult<'_, Vec<String>> {
    let (input, _) = pair(char('('), ws)(input)?;
    let (input, names) = separated_list0(tuple((ws, char(','), ws)), param)(input)?;
    let (input, _) = pair(ws, char(')'))(input)?;
    Ok((input, names.into_iter().map(str::to_string).collect()))
}

impl<'a> Grammar<'a> {
    /// Statements up to a closing `}` or the end of input.
    pub fn statements(&self, input: &'a str) -> PResult<'a, Vec<Stmt>> {
        let mut statements = Vec::new();
        let (mut input, _) = separators(input)?;
        while !input.is_empty() && !input.starts_with('}') {
            let (rest, stmt) = self.statement(input)?;
            let (rest, _) = statement_end(rest)?;
            statements.push(stmt);
            input = separators(rest)?.0;
        }
        Ok((input, statements))
    }

    pub fn statement(&self, input: &'a str) -> PResult<'a, Stmt> {
        alt((
            |i| self.if_stmt(i),
            |i| self.return_stmt(i),
            |i| self.declaration(i),
            |i| self.command_call(i),
            |i| {
                let span = self.span(i);
                self.expr(i)
                    .map(|(rest, e)| (rest, Stmt::new(StmtKind::Expr(e), span)))
            },
        ))(input)
    }

    pub fn block(&self, input: &'a str) -> PResult<'a, Block> {
        let span = self.span(input);
        let (input, _) = char('{')(input)?;
        let (input, statements) = self.statements(input)?;
        let (input, _) = pair(ws, char('}'))(input)?;
        Ok((input, Block::new(statements, span)))
    }

    /// A braced block, or a single statement standing in for one.
    fn body(&self, input: &'a str) -> PResult<'a, Block> {
        if input.starts_with('{') {
            return self.block(input);
        }
        let span = self.span(input);
        let (input, stmt) = self.statement(input)?;
        Ok((input, Block::new(vec![stmt], span)))
    }

    fn if_stmt(&self, input: &'a str) -> PResult<'a, Stmt> {
        let span = self.span(input);
        let (input, _) = tuple((keyword("if"), ws, char('('), ws))(input)?;
        let (input, cond) = self.expr(input)?;
        let (input, _) = tuple((ws, char(')'), ws))(input)?;
        let (input, then) = self.body(input)?;

        let otherwise = tuple((ws, keyword("else"), ws))(input);
        let (input, otherwise) = match otherwise {
            Ok((rest, _)) if keyword("if")(rest).is_ok() => {
                let inner_span = self.span(rest);
                let (rest, nested) = self.if_stmt(rest)?;
                (rest, Some(Block::new(vec![nested], inner_span)))
            }
            Ok((rest, _)) => {
                let (rest, block) = self.body(rest)?;
                (rest, Some(block))
            }
            Err(_) => (input, None),
        };
        Ok((
            input,
            Stmt::new(
                StmtKind::If {
                    cond,
                    then,
                    otherwise,
                },
                span,
            ),
        ))
    }

    fn return_stmt(&self, input: &'a str) -> PResult<'a, Stmt> {
        let span = self.span(input);
        let (input, _) = keyword("return")(input)?;
        let (input, value) = match hs1(input) {
            Ok((rest, _)) if !matches!(rest.chars().next(), None | Some('\n' | ';' | '}')) => {
                let (rest, value) = self.expr(rest)?;
                (rest, Some(value))
            }
            _ => (input, None),
        };
        Ok((input, Stmt::new(StmtKind::Return(value), span)))
    }

    /// `def name = init` or `Type name = init`.
    fn declaration(&self, input: &'a str) -> PResult<'a, Stmt> {
        let span = self.span(input);
        let (input, ty) = terminated(declared_type, hs1)(input)?;
        let (input, ident) = name(input)?;
        let (input, init) = self.initializer(input)?;
        Ok((
            input,
            Stmt::new(
                StmtKind::Declare {
                    ty: ty.map(str::to_string),
                    name: ident.to_string(),
                    init,
                },
                span,
            ),
        ))
    }

    fn initializer(&self, input: &'a str) -> PResult<'a, Option<Expr>> {
        let assign = tuple((hs, char('='), not(char('=')), ws))(input);
        match assign {
            Ok((rest, _)) => {
                let (rest, init) = self.expr(rest)?;
                Ok((rest, Some(init)))
            }
            Err(_) => Ok((input, None)),
        }
    }

    /// Paren-less call: `select all, limit(10)`.
    fn command_call(&self, input: &'a str) -> PResult<'a, Stmt> {
        let span = self.span(input);
        let (rest, method) = name(input)?;
        let (rest, _) = hs1(rest)?;
        let (rest, _) = starts_command_argument(rest)?;
        let (rest, args) = self.command_args(rest)?;
        let call = Expr::new(
            ExprKind::Call {
                object: None,
                method: method.to_string(),
                args,
            },
            span,
        );
        Ok((rest, Stmt::new(StmtKind::Expr(call), span)))
    }

    pub fn module(&self, input: &'a str) -> PResult<'a, Module> {
        let mut items = Vec::new();
        let (mut input, _) = separators(input)?;
        while !input.is_empty() && !input.starts_with('}') {
            let (rest, item) = alt((
                |i| self.class_decl(i).map(|(r, c)| (r, Item::Class(c))),
                |i| self.method_decl(i).map(|(r, m)| (r, Item::Method(m))),
                |i| self.statement(i).map(|(r, s)| (r, Item::Statement(s))),
            ))(input)?;
            let (rest, _) = statement_end(rest)?;
            items.push(item);
            input = separators(rest)?.0;
        }
        Ok((input, Module { items }))
    }

    fn class_decl(&self, input: &'a str) -> PResult<'a, ClassNode> {
        let span = self.span(input);
        let (input, modifiers) = modifiers(input)?;
        let (input, _) = pair(keyword("class"), hs1)(input)?;
        let (input, class_name) = identifier(input)?;
        let (input, superclass) =
            opt(tuple((hs1, keyword("extends"), hs1, qualified_name)))(input)?;
        let (input, _) = tuple((ws, char('{')))(input)?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let (mut input, _) = separators(input)?;
        while !input.is_empty() && !input.starts_with('}') {
            let (rest, member) = self.member(input)?;
            let (rest, _) = statement_end(rest)?;
            match member {
                Member::Field(field) => fields.push(field),
                Member::Method(method) => methods.push(method),
            }
            input = separators(rest)?.0;
        }
        let (input, _) = char('}')(input)?;
        Ok((
            input,
            ClassNode {
                modifiers,
                name: class_name.to_string(),
                superclass: superclass.map(|(_, _, _, ty)| ty.to_string()),
                fields,
                methods,
                span,
            },
        ))
    }

    fn member(&self, input: &'a str) -> PResult<'a, Member> {
        match self.method_decl(input) {
            Ok((rest, method)) => return Ok((rest, Member::Method(method))),
            Err(nom::Err::Error(_)) => {}
            Err(e) => return Err(e),
        }
        let span = self.span(input);
        let (input, modifiers) = modifiers(input)?;
        let (input, ty) = opt(terminated(declared_type, hs1))(input)?;
        let (input, field_name) = name(input)?;
        let (input, init) = self.initializer(input)?;
        Ok((
            input,
            Member::Field(FieldNode {
                modifiers,
                ty: ty.flatten().map(str::to_string),
                name: field_name.to_string(),
                init,
                span,
            }),
        ))
    }

    /// `[modifiers] def|Type name(params) { body }`
    fn method_decl(&self, input: &'a str) -> PResult<'a, MethodNode> {
        let span = self.span(input);
        let (input, modifiers) = modifiers(input)?;
        let (input, return_ty) = if modifiers.is_empty() {
            terminated(declared_type, hs1)(input)?
        } else {
            let (input, ty) = opt(terminated(declared_type, hs1))(input)?;
            (input, ty.flatten())
        };
        let (input, method_name) = name(input)?;
        let (input, _) = hs(input)?;
        let (input, params) = params(input)?;
        let (input, _) = ws(input)?;
        let (input, body) = self.block(input)?;
        Ok((
            input,
            MethodNode {
                modifiers,
                return_ty: return_ty.map(str::to_string),
                name: method_name.to_string(),
                params,
                body,
                span,
            },
        ))
    }
}
