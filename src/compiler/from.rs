//! `from`: kind, typed result or kindless ancestor query.

use super::keywords::is_ancestor_name;
use super::{Clause, Compiler, QuerySpec, Representation};
use crate::ast::{BinaryOp, Expr, ExprKind, Span};
use crate::fmt::render_expr;
use crate::resolver::simple_name;

/// What the first `from` argument names.
enum Target {
    Kind(String),
    Typed {
        type_name: String,
        representation: Representation,
    },
    Ancestor(String),
}

/// Ancestor forms: `childOf = key` and `childOf(key)`.
enum AncestorArg {
    Value(String),
    /// An ancestor name with a malformed value.
    Invalid,
    NotAncestor,
}

impl Compiler<'_> {
    pub(super) fn compile_from(
        &mut self,
        spec: &mut QuerySpec,
        args: &[Expr],
        span: Span,
    ) -> Option<Clause> {
        let Some(first) = args.first() else {
            self.diagnostics
                .shape("'from' must have one or two arguments", span);
            return None;
        };
        if args.len() > 2 {
            self.diagnostics
                .shape("'from' must have one or two arguments", span);
        }

        self.fields = None;
        let target = self.from_target(first);
        let mut kind = None;
        let mut type_name = None;
        let mut representation = None;
        let mut ancestor = None;

        match target {
            Some(Target::Ancestor(value)) => {
                if args.len() > 1 {
                    self.diagnostics.shape(
                        "'from' contains too many parameters for kindless query",
                        first.span,
                    );
                }
                ancestor = Some(value);
            }
            Some(Target::Kind(name)) => kind = Some(name),
            Some(Target::Typed {
                type_name: written,
                representation: repr,
            }) => {
                kind = Some(simple_name(&written).to_string());
                type_name = Some(written);
                representation = Some(repr);
            }
            None => {}
        }

        if kind.is_some() {
            if let Some(second) = args.get(1) {
                match self.ancestor_arg(second) {
                    AncestorArg::Value(value) => ancestor = Some(value),
                    AncestorArg::Invalid => {}
                    AncestorArg::NotAncestor => self.diagnostics.shape(
                        "The second argument contains an expression that 'from' doesn't support",
                        second.span,
                    ),
                }
            }
        } else if ancestor.is_none() {
            self.diagnostics.shape("Unsupported 'from' expression", span);
        }

        spec.kindless_ancestor = kind.is_none() && ancestor.is_some();
        spec.kind = kind.clone();
        spec.type_name = type_name.clone();
        spec.representation = representation;
        spec.ancestor = ancestor.clone();

        Some(Clause::From {
            kind,
            type_name,
            representation,
            ancestor,
        })
    }

    fn from_target(&mut self, arg: &Expr) -> Option<Target> {
        match self.ancestor_arg(arg) {
            AncestorArg::Value(value) => return Some(Target::Ancestor(value)),
            AncestorArg::Invalid => return None,
            AncestorArg::NotAncestor => {}
        }
        match &arg.kind {
            ExprKind::Variable(name) => Some(Target::Kind(name.clone())),
            ExprKind::Cast { expr, ty } => self.typed_target(expr, ty, arg.span),
            ExprKind::Call { .. } | ExprKind::Binary { .. } => None,
            _ => {
                self.diagnostics
                    .shape("Unsupported argument expression for 'from'", arg.span);
                None
            }
        }
    }

    /// `marker as Type`
    fn typed_target(&mut self, marker: &Expr, ty: &str, span: Span) -> Option<Target> {
        let Some(marker_name) = marker.as_variable() else {
            self.diagnostics.shape(
                format!(
                    "'from' doesn't support the argument expression: {} (left part)",
                    render_expr(marker)
                ),
                marker.span,
            );
            return None;
        };
        let Some(representation) = Representation::from_marker(marker_name) else {
            self.diagnostics
                .vocabulary("'from' can contain 'pojo' or 'bean' or 'entity'", span);
            return None;
        };
        if !self.resolver.knows(ty) {
            self.diagnostics.resolution(
                format!("Can't resolve the type '{}'", simple_name(ty)),
                span,
            );
        }
        self.fields = self.resolver.resolve(ty);
        Some(Target::Typed {
            type_name: ty.to_string(),
            representation,
        })
    }

    fn ancestor_arg(&mut self, arg: &Expr) -> AncestorArg {
        match &arg.kind {
            ExprKind::Binary {
                left,
                op: BinaryOp::Assign,
                right,
            } => match left.as_variable() {
                Some(name) if is_ancestor_name(name) => AncestorArg::Value(render_expr(right)),
                _ => AncestorArg::NotAncestor,
            },
            ExprKind::Call {
                object: None,
                method,
                args,
            } if is_ancestor_name(method) => match args.as_slice() {
                [value] => AncestorArg::Value(render_expr(value)),
                _ => {
                    self.diagnostics.shape(
                        format!("Invalid argument value: {}", render_expr(arg)),
                        arg.span,
                    );
                    AncestorArg::Invalid
                }
            },
            _ => AncestorArg::NotAncestor,
        }
    }
}
