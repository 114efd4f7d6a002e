//! Source printer for the host syntax tree.
//!
//! Output parses back to an equivalent tree; layout and comments of the
//! original text are not preserved.

use std::fmt::{Result, Write};

use crate::ast::{Block, ClassNode, FieldNode, Item, MethodNode, Module, Stmt, StmtKind};

mod render;

pub use render::{quote, render_expr};

#[cfg(test)]
mod tests;

pub struct Formatter {
    indent_level: usize,
    buffer: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            buffer: String::new(),
        }
    }

    pub fn format_module(
        mut self,
        module: &Module,
    ) -> std::result::Result<String, std::fmt::Error> {
        self.visit_module(module)?;
        Ok(self.buffer)
    }

    /// Print the statements of `block` without surrounding braces.
    pub fn format_block(mut self, block: &Block) -> std::result::Result<String, std::fmt::Error> {
        self.visit_statements(block)?;
        Ok(self.buffer)
    }

    fn indent(&mut self) -> Result {
        for _ in 0..self.indent_level {
            write!(self.buffer, "  ")?;
        }
        Ok(())
    }

    fn visit_module(&mut self, module: &Module) -> Result {
        let mut previous_was_declaration = false;
        for (i, item) in module.items.iter().enumerate() {
            let is_declaration = !matches!(item, Item::Statement(_));
            if i > 0 && (is_declaration || previous_was_declaration) {
                writeln!(self.buffer)?;
            }
            match item {
                Item::Class(class) => self.visit_class(class)?,
                Item::Method(method) => self.visit_method(method)?,
                Item::Statement(stmt) => self.visit_stmt(stmt)?,
            }
            previous_was_declaration = is_declaration;
        }
        Ok(())
    }

    fn modifiers(&mut self, modifiers: &[String]) -> Result {
        for modifier in modifiers {
            write!(self.buffer, "{} ", modifier)?;
        }
        Ok(())
    }

    fn visit_class(&mut self, class: &ClassNode) -> Result {
        self.indent()?;
        self.modifiers(&class.modifiers)?;
        write!(self.buffer, "class {}", class.name)?;
        if let Some(superclass) = &class.superclass {
            write!(self.buffer, " extends {}", superclass)?;
        }
        writeln!(self.buffer, " {{")?;
        self.indent_level += 1;
        for field in &class.fields {
            self.visit_field(field)?;
        }
        for (i, method) in class.methods.iter().enumerate() {
            if i > 0 || !class.fields.is_empty() {
                writeln!(self.buffer)?;
            }
            self.visit_method(method)?;
        }
        self.indent_level -= 1;
        self.indent()?;
        writeln!(self.buffer, "}}")
    }

    fn visit_field(&mut self, field: &FieldNode) -> Result {
        self.indent()?;
        self.modifiers(&field.modifiers)?;
        write!(
            self.buffer,
            "{} {}",
            field.ty.as_deref().unwrap_or("def"),
            field.name
        )?;
        if let Some(init) = &field.init {
            write!(self.buffer, " = ")?;
            self.visit_expr(init)?;
        }
        writeln!(self.buffer)
    }

    fn visit_method(&mut self, method: &MethodNode) -> Result {
        self.indent()?;
        self.modifiers(&method.modifiers)?;
        writeln!(
            self.buffer,
            "{} {}({}) {{",
            method.return_ty.as_deref().unwrap_or("def"),
            method.name,
            method.params.join(", ")
        )?;
        self.nested(&method.body)?;
        self.indent()?;
        writeln!(self.buffer, "}}")
    }

    /// Statements of `block`, one level deeper.
    fn nested(&mut self, block: &Block) -> Result {
        self.indent_level += 1;
        self.visit_statements(block)?;
        self.indent_level -= 1;
        Ok(())
    }

    fn visit_statements(&mut self, block: &Block) -> Result {
        for stmt in &block.statements {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result {
        self.indent()?;
        self.visit_stmt_inline(stmt)?;
        writeln!(self.buffer)
    }

    /// A statement starting at the current position, without a line break.
    fn visit_stmt_inline(&mut self, stmt: &Stmt) -> Result {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.visit_expr(expr),
            StmtKind::Declare { ty, name, init } => {
                write!(self.buffer, "{} {}", ty.as_deref().unwrap_or("def"), name)?;
                if let Some(init) = init {
                    write!(self.buffer, " = ")?;
                    self.visit_expr(init)?;
                }
                Ok(())
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                write!(self.buffer, "if (")?;
                self.visit_expr(cond)?;
                writeln!(self.buffer, ") {{")?;
                self.nested(then)?;
                self.indent()?;
                write!(self.buffer, "}}")?;
                if let Some(otherwise) = otherwise {
                    match otherwise.statements.as_slice() {
                        [nested @ Stmt {
                            kind: StmtKind::If { .. },
                            ..
                        }] => {
                            write!(self.buffer, " else ")?;
                            self.visit_stmt_inline(nested)?;
                        }
                        _ => {
                            writeln!(self.buffer, " else {{")?;
                            self.nested(otherwise)?;
                            self.indent()?;
                            write!(self.buffer, "}}")?;
                        }
                    }
                }
                Ok(())
            }
            StmtKind::Return(value) => {
                write!(self.buffer, "return")?;
                if let Some(value) = value {
                    write!(self.buffer, " ")?;
                    self.visit_expr(value)?;
                }
                Ok(())
            }
        }
    }
}

/// Print a whole module.
pub fn print_module(module: &Module) -> std::result::Result<String, std::fmt::Error> {
    Formatter::new().format_module(module)
}

/// Print the statements of a block.
pub fn print_block(block: &Block) -> std::result::Result<String, std::fmt::Error> {
    Formatter::new().format_block(block)
}
