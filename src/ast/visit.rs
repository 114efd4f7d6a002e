//! Mutable syntax tree traversal.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to keep descending.

use super::*;

pub trait VisitMut {
    fn visit_module_mut(&mut self, module: &mut Module) {
        walk_module_mut(self, module);
    }

    fn visit_class_mut(&mut self, class: &mut ClassNode) {
        walk_class_mut(self, class);
    }

    fn visit_field_mut(&mut self, field: &mut FieldNode) {
        if let Some(init) = &mut field.init {
            self.visit_expr_mut(init);
        }
    }

    fn visit_method_mut(&mut self, method: &mut MethodNode) {
        self.visit_block_mut(&mut method.body);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        for stmt in &mut block.statements {
            self.visit_stmt_mut(stmt);
        }
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }
}

pub fn walk_module_mut<V: VisitMut + ?Sized>(v: &mut V, module: &mut Module) {
    for item in &mut module.items {
        match item {
            Item::Class(class) => v.visit_class_mut(class),
            Item::Method(method) => v.visit_method_mut(method),
            Item::Statement(stmt) => v.visit_stmt_mut(stmt),
        }
    }
}

pub fn walk_class_mut<V: VisitMut + ?Sized>(v: &mut V, class: &mut ClassNode) {
    for field in &mut class.fields {
        v.visit_field_mut(field);
    }
    for method in &mut class.methods {
        v.visit_method_mut(method);
    }
}

pub fn walk_stmt_mut<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Expr(expr) => v.visit_expr_mut(expr),
        StmtKind::Declare { init, .. } => {
            if let Some(init) = init {
                v.visit_expr_mut(init);
            }
        }
        StmtKind::If {
            cond,
            then,
            otherwise,
        } => {
            v.visit_expr_mut(cond);
            v.visit_block_mut(then);
            if let Some(otherwise) = otherwise {
                v.visit_block_mut(otherwise);
            }
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                v.visit_expr_mut(value);
            }
        }
    }
}

pub fn walk_expr_mut<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Variable(_) | ExprKind::Constant(_) => {}
        ExprKind::Property { object, .. } => v.visit_expr_mut(object),
        ExprKind::Call { object, args, .. } => {
            if let Some(object) = object {
                v.visit_expr_mut(object);
            }
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
        ExprKind::Constructor { args, .. } | ExprKind::List(args) => {
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
        ExprKind::Cast { expr, .. }
        | ExprKind::Not(expr)
        | ExprKind::Negate(expr)
        | ExprKind::Spread(expr) => v.visit_expr_mut(expr),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        ExprKind::Closure(closure) => v.visit_block_mut(&mut closure.body),
    }
}
