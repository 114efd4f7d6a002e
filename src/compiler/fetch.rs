//! `select`, `cursor` and `fetchOptions`: selection mode plus fetch tuning.

use super::keywords::{FetchParam, Keyword, matches_word};
use super::{Clause, Compiler, QuerySpec, SelectionMode, Setting};
use crate::ast::{BinaryOp, Expr, ExprKind, Span};
use crate::fmt::render_expr;

const SELECT_PARAMS: &[FetchParam] = &[FetchParam::Limit, FetchParam::Offset];
const CURSOR_PARAMS: &[FetchParam] = &[
    FetchParam::StartCursor,
    FetchParam::EndCursor,
    FetchParam::Limit,
];
const OPTION_PARAMS: &[FetchParam] = &[FetchParam::ChunkSize, FetchParam::PrefetchSize];

impl Compiler<'_> {
    pub(super) fn compile_select(
        &mut self,
        spec: &mut QuerySpec,
        args: &[Expr],
        span: Span,
    ) -> Clause {
        const MODE_ERROR: &str =
            "'select' must have the first argument as one of [all,keys,single,count]";
        let mode = match args.first() {
            None => {
                self.diagnostics.shape(MODE_ERROR, span);
                None
            }
            Some(first) => {
                let mode = first.as_variable().and_then(SelectionMode::parse);
                if mode.is_none() {
                    self.diagnostics.vocabulary(MODE_ERROR, first.span);
                }
                mode
            }
        };
        let rest = args.get(1..).unwrap_or_default();
        let settings = self.compile_settings(spec, Keyword::Select, rest, SELECT_PARAMS);

        if let Some(mode) = mode {
            spec.selection = mode;
        }
        spec.cursor = false;
        Clause::Select { mode, settings }
    }

    pub(super) fn compile_cursor(&mut self, spec: &mut QuerySpec, args: &[Expr]) -> Clause {
        let (mode, rest) = match args.split_first() {
            Some((first, rest)) => match first.as_variable() {
                Some(name) => (self.cursor_mode(name, first.span), rest),
                None => (SelectionMode::All, args),
            },
            None => (SelectionMode::All, args),
        };
        let settings = self.compile_settings(spec, Keyword::Cursor, rest, CURSOR_PARAMS);

        spec.selection = mode;
        spec.cursor = true;
        Clause::Cursor { mode, settings }
    }

    fn cursor_mode(&mut self, name: &str, span: Span) -> SelectionMode {
        if matches_word(name, "keys") {
            return SelectionMode::Keys;
        }
        if !matches_word(name, "all") {
            self.diagnostics.vocabulary(
                "'cursor' may only have the first argument as one of [all,keys]",
                span,
            );
        }
        SelectionMode::All
    }

    pub(super) fn compile_fetch_options(&mut self, spec: &mut QuerySpec, args: &[Expr]) -> Clause {
        let settings = self.compile_settings(spec, Keyword::FetchOptions, args, OPTION_PARAMS);
        Clause::FetchOptions { settings }
    }

    /// Read `name(value)` and `name = value` arguments restricted to `allowed`.
    fn compile_settings(
        &mut self,
        spec: &mut QuerySpec,
        keyword: Keyword,
        args: &[Expr],
        allowed: &[FetchParam],
    ) -> Vec<Setting> {
        let mut settings = Vec::with_capacity(args.len());
        for arg in args {
            let Some((name, value)) = self.setting_parts(keyword, arg) else {
                continue;
            };
            let param = FetchParam::parse(name).filter(|p| allowed.contains(p));
            let Some(param) = param else {
                self.diagnostics.vocabulary(
                    format!("'{}' doesn't support the argument '{}'", keyword, name),
                    arg.span,
                );
                continue;
            };
            let Some(value) = value else {
                self.diagnostics.shape(
                    format!("Invalid argument value: {}", render_expr(arg)),
                    arg.span,
                );
                continue;
            };
            let value = render_expr(value);
            spec.fetch.set(param, value.clone());
            settings.push(Setting { param, value });
        }
        settings
    }

    /// Split a setting argument into its name and single value.
    fn setting_parts<'e>(
        &mut self,
        keyword: Keyword,
        arg: &'e Expr,
    ) -> Option<(&'e str, Option<&'e Expr>)> {
        match &arg.kind {
            ExprKind::Call {
                object: None,
                method,
                args,
            } => match args.as_slice() {
                [value] => Some((method.as_str(), Some(value))),
                _ => Some((method.as_str(), None)),
            },
            ExprKind::Binary { left, op, right } => {
                let Some(name) = left.as_variable() else {
                    self.diagnostics.shape(
                        format!("Unsupported argument expression for '{}'", keyword),
                        arg.span,
                    );
                    return None;
                };
                if *op != BinaryOp::Assign {
                    self.diagnostics.vocabulary(
                        format!(
                            "'{}' doesn't support operation '{}' ({} {} {})",
                            keyword,
                            op,
                            name,
                            op,
                            render_expr(right)
                        ),
                        arg.span,
                    );
                    return None;
                }
                Some((name, Some(&**right)))
            }
            _ => {
                self.diagnostics.shape(
                    format!(
                        "'{}' doesn't support the argument expression: '{}'",
                        keyword,
                        render_expr(arg)
                    ),
                    arg.span,
                );
                None
            }
        }
    }
}
