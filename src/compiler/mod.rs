//! Statement compiler.
//!
//! Walks the statements of a classified query block in order and folds them
//! into a [`QuerySpec`]. Rule violations are recorded as diagnostics against
//! the offending node; compilation always continues with the next statement
//! so one pass reports every problem of a block.

pub mod keywords;
pub mod query;

mod fetch;
mod filter;
mod from;
mod order;

pub use keywords::{FetchParam, Keyword};
pub use query::*;

use crate::ast::{Block, Expr, ExprKind, Span, Stmt};
use crate::config::TransformConfig;
use crate::error::Diagnostics;
use crate::fmt::render_expr;
use crate::resolver::{FieldSet, TypeResolver};

pub struct Compiler<'a> {
    config: &'a TransformConfig,
    resolver: &'a dyn TypeResolver,
    diagnostics: &'a mut Diagnostics,
    /// Declared fields of the typed `from` result, when resolvable.
    fields: Option<FieldSet>,
}

impl<'a> Compiler<'a> {
    pub fn new(
        config: &'a TransformConfig,
        resolver: &'a dyn TypeResolver,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            config,
            resolver,
            diagnostics,
            fields: None,
        }
    }

    /// Compile every statement of `block` into a fresh query.
    pub fn compile(&mut self, block: &Block) -> QuerySpec {
        let mut spec = QuerySpec::new();
        self.fields = None;
        for stmt in &block.statements {
            self.compile_statement(&mut spec, stmt);
        }
        spec
    }

    fn compile_statement(&mut self, spec: &mut QuerySpec, stmt: &Stmt) {
        let Some(expr) = stmt.as_expr() else {
            self.diagnostics
                .vocabulary("Unsupported statement in a query block", stmt.span);
            return;
        };
        match &expr.kind {
            // `select` on its own line
            ExprKind::Variable(name) if keywords::is_keyword(name) => {}
            ExprKind::Variable(name) => {
                self.diagnostics
                    .vocabulary(format!("Unsupported name: {}", name), expr.span);
            }
            ExprKind::Call {
                object: None,
                method,
                args,
            } => match Keyword::parse(method) {
                Some(keyword) => self.compile_keyword(spec, keyword, args, expr.span),
                None => self
                    .diagnostics
                    .vocabulary(format!("Unsupported name: {}", method), expr.span),
            },
            _ => self.diagnostics.vocabulary(
                format!("Unsupported expression: {}", render_expr(expr)),
                expr.span,
            ),
        }
    }

    fn compile_keyword(
        &mut self,
        spec: &mut QuerySpec,
        keyword: Keyword,
        args: &[Expr],
        span: Span,
    ) {
        tracing::trace!(%keyword, args = args.len(), "compiling statement");
        let clause = match keyword {
            Keyword::Select => self.compile_select(spec, args, span),
            Keyword::Cursor => self.compile_cursor(spec, args),
            Keyword::From => match self.compile_from(spec, args, span) {
                Some(clause) => clause,
                None => return,
            },
            Keyword::Where => self.compile_where(spec, args),
            Keyword::OrderBy => self.compile_order_by(spec, args),
            Keyword::FetchOptions => self.compile_fetch_options(spec, args),
        };
        spec.clauses.push(clause);
    }

    fn is_key_property(&self, field: &str) -> bool {
        field == self.config.key_property
    }

    /// Report `field` when the resolved result type does not declare it.
    fn check_field(&mut self, field: &str, span: Span) {
        if self.is_key_property(field) {
            return;
        }
        let Some(fields) = &self.fields else {
            return;
        };
        if fields.contains(field) {
            return;
        }
        let mut message = format!(
            "Class '{}' doesn't contain a field with a name '{}'",
            fields.type_name(),
            field
        );
        if let Some(suggestion) = fields.suggest(field) {
            message.push_str(&format!("; did you mean '{}'?", suggestion));
        }
        self.diagnostics.resolution(message, span);
    }
}
