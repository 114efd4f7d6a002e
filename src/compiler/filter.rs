//! `where`: filter predicates and the inequality rules.
//!
//! A query may use inequality operators (`<`, `<=`, `>`, `>=`, `!=`) on a
//! single property only, at most [`QuerySpec::MAX_INEQUALITIES`] times, and a
//! not-equal filter excludes every other inequality.

use super::{Clause, Compiler, Filter, FilterOperator, QuerySpec};
use crate::ast::{Expr, ExprKind};
use crate::fmt::render_expr;

impl Compiler<'_> {
    pub(super) fn compile_where(&mut self, spec: &mut QuerySpec, args: &[Expr]) -> Clause {
        let mut filters = Vec::with_capacity(args.len());
        for predicate in args {
            if let Some(filter) = self.compile_predicate(spec, predicate) {
                spec.filters.push(filter.clone());
                filters.push(filter);
            }
        }
        Clause::Where { filters }
    }

    fn compile_predicate(&mut self, spec: &mut QuerySpec, predicate: &Expr) -> Option<Filter> {
        let ExprKind::Binary { left, op, right } = &predicate.kind else {
            self.diagnostics.shape(
                format!(
                    "'where' doesn't support the argument expression: {}",
                    render_expr(predicate)
                ),
                predicate.span,
            );
            return None;
        };
        let Some(field) = left.as_variable() else {
            self.diagnostics.shape(
                format!(
                    "'where' doesn't support the argument expression: {} (left part)",
                    render_expr(predicate)
                ),
                left.span,
            );
            return None;
        };
        let Some(operator) = FilterOperator::from_binary(*op) else {
            self.diagnostics.vocabulary(
                format!(
                    "'where' doesn't support the operation: {} ({})",
                    op,
                    render_expr(predicate)
                ),
                predicate.span,
            );
            return None;
        };

        self.check_field(field, left.span);

        if operator.is_inequality() {
            self.claim_inequality(spec, field, operator, predicate);
        }

        if spec.kindless_ancestor && !self.is_key_property(field) {
            self.diagnostics.semantic(
                format!(
                    "Kindless queries cannot include filters on properties ( field = '{}' )",
                    field
                ),
                predicate.span,
            );
        }

        if spec.cursor && matches!(operator, FilterOperator::In | FilterOperator::NotEqual) {
            self.diagnostics.semantic(
                format!(
                    "Cursor query can't contain 'in' or '!=' filter operation ( field = '{}' )",
                    field
                ),
                predicate.span,
            );
        }

        Some(Filter {
            field: field.to_string(),
            operator,
            value: render_expr(right),
        })
    }

    fn claim_inequality(
        &mut self,
        spec: &mut QuerySpec,
        field: &str,
        operator: FilterOperator,
        predicate: &Expr,
    ) {
        let not_equal = operator == FilterOperator::NotEqual;
        match spec.inequality_field.clone() {
            Some(existing) if existing != field => {
                self.diagnostics.semantic(
                    format!(
                        "A query may only use inequality filters (<, <=, >=, >, !=) on one property. ('{}' - exists; '{}' - new )",
                        existing, field
                    ),
                    predicate.span,
                );
            }
            _ if spec.has_not_equal || (not_equal && spec.inequality_count > 0) => {
                self.diagnostics.semantic(
                    "A query can only have one not-equal filter and cannot have other inequality filters",
                    predicate.span,
                );
            }
            Some(_) => {}
            None => {
                spec.inequality_field = Some(field.to_string());
                // sorts registered before this filter must start with it
                if let Some(first) = spec.sorts.first()
                    && first.field != field
                {
                    self.diagnostics.semantic(
                        format!(
                            "Properties in inequality filters must be ordered before other sort orders ( '{}' - now; '{}' must be )",
                            first.field, field
                        ),
                        predicate.span,
                    );
                }
            }
        }

        spec.inequality_count += 1;
        if spec.inequality_count > QuerySpec::MAX_INEQUALITIES {
            self.diagnostics.semantic(
                format!(
                    "Too many inequality filter expressions (<, <=, >=, >, !=). ( field = '{}' )",
                    field
                ),
                predicate.span,
            );
        }
        if not_equal {
            spec.has_not_equal = true;
        }
    }
}
