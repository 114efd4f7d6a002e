//! `orderBy`: sort keys, `field` or `field as DESC`.

use super::{Clause, Compiler, QuerySpec, Sort, SortDirection};
use crate::ast::{Expr, ExprKind};
use crate::fmt::render_expr;

impl Compiler<'_> {
    pub(super) fn compile_order_by(&mut self, spec: &mut QuerySpec, args: &[Expr]) -> Clause {
        let mut sorts = Vec::with_capacity(args.len());
        for (i, key) in args.iter().enumerate() {
            let Some(sort) = self.sort_key(key) else {
                continue;
            };
            self.check_field(&sort.field, key.span);

            if spec.kindless_ancestor {
                let key_property = &self.config.key_property;
                if sort.field != *key_property {
                    self.diagnostics.semantic(
                        format!(
                            "Kindless ancestor query can be only sorted on '{}' ( field = '{}' )",
                            key_property, sort.field
                        ),
                        key.span,
                    );
                } else if sort.direction == SortDirection::Descending {
                    self.diagnostics.semantic(
                        format!(
                            "Only 'Ascending' direction on {} is supported",
                            key_property
                        ),
                        key.span,
                    );
                }
            }

            if i == 0
                && let Some(inequality) = &spec.inequality_field
                && *inequality != sort.field
            {
                self.diagnostics.semantic(
                    format!(
                        "Properties in inequality filters must be ordered before other sort orders ( '{}' - now; '{}' must be )",
                        sort.field, inequality
                    ),
                    key.span,
                );
            }

            spec.sorts.push(sort.clone());
            sorts.push(sort);
        }
        Clause::OrderBy { sorts }
    }

    fn sort_key(&mut self, key: &Expr) -> Option<Sort> {
        match &key.kind {
            ExprKind::Variable(field) => Some(Sort {
                field: field.clone(),
                direction: SortDirection::Ascending,
            }),
            ExprKind::Cast { expr, ty } => {
                let Some(field) = expr.as_variable() else {
                    self.diagnostics.shape(
                        format!(
                            "'orderBy' doesn't support the argument expression: {} (left part)",
                            render_expr(key)
                        ),
                        expr.span,
                    );
                    return None;
                };
                let Some(direction) = SortDirection::from_marker(ty) else {
                    self.diagnostics
                        .vocabulary("'orderBy' direction must be 'ASC' or 'DESC'", key.span);
                    return None;
                };
                Some(Sort {
                    field: field.to_string(),
                    direction,
                })
            }
            _ => {
                self.diagnostics.shape(
                    format!(
                        "'orderBy' doesn't support the argument expression: {}",
                        render_expr(key)
                    ),
                    key.span,
                );
                None
            }
        }
    }
}
