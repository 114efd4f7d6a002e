//! Host script parser using nom.
//!
//! Parses the subset of the host language that query blocks live in, and
//! that the emitter generates: classes, methods, `def` declarations, `if`
//! statements, closures, paren-less command calls and the usual expression
//! operators.
//!
//! ```text
//! def people = datastore.executeQuery {
//!     select all, limit(10)      <- command call, two arguments
//!     from entity as Person      <- `as` cast
//!     where age > 5              <- binary predicate
//! }
//! ```

pub mod expressions;
pub mod statements;
pub mod tokens;

#[cfg(test)]
mod tests;

use crate::ast::{Block, Expr, Module, Span};
use crate::error::{KindqlError, KindqlResult};
use tokens::separators;

/// Turns program text into syntax tree fragments.
///
/// The transformer hands generated query code to this port and splices the
/// resulting block into the host tree.
pub trait HostParser {
    fn parse_block(&self, source: &str) -> KindqlResult<Block>;
}

/// The built-in [`HostParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptParser;

impl HostParser for ScriptParser {
    fn parse_block(&self, source: &str) -> KindqlResult<Block> {
        parse_block(source)
    }
}

/// Parse a complete source file.
pub fn parse_module(input: &str) -> KindqlResult<Module> {
    let grammar = Grammar::new(input);
    match grammar.module(input) {
        Ok((rest, module)) => grammar.expect_end(rest).map(|_| module),
        Err(e) => Err(grammar.error(e)),
    }
}

/// Parse a statement list, as found in a method or closure body.
pub fn parse_block(input: &str) -> KindqlResult<Block> {
    let grammar = Grammar::new(input);
    match grammar.statements(input) {
        Ok((rest, statements)) => {
            grammar.expect_end(rest)?;
            Ok(Block::new(statements, Span::new(1, 1)))
        }
        Err(e) => Err(grammar.error(e)),
    }
}

/// Parse a single expression.
pub fn parse_expr(input: &str) -> KindqlResult<Expr> {
    let grammar = Grammar::new(input);
    let trimmed = input.trim_start();
    match grammar.expr(trimmed) {
        Ok((rest, expr)) => grammar.expect_end(rest).map(|_| expr),
        Err(e) => Err(grammar.error(e)),
    }
}

/// Grammar rules over one source text; positions are computed against it.
pub struct Grammar<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> Grammar<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Position of `rest`, which must be a suffix of the source.
    pub fn span(&self, rest: &str) -> Span {
        let offset = self.source.len().saturating_sub(rest.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.source[line_start..offset].chars().count() + 1;
        Span::new(line, column)
    }

    fn expect_end(&self, rest: &'a str) -> KindqlResult<()> {
        let rest = match separators(rest) {
            Ok((rest, _)) => rest,
            Err(e) => return Err(self.error(e)),
        };
        if rest.is_empty() {
            Ok(())
        } else {
            Err(KindqlError::parse(
                self.span(rest),
                format!("Unexpected trailing content: '{}'", snippet(rest)),
            ))
        }
    }

    fn error(&self, err: nom::Err<nom::error::Error<&'a str>>) -> KindqlError {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => KindqlError::parse(
                self.span(e.input),
                format!("Unexpected input near '{}'", snippet(e.input)),
            ),
            nom::Err::Incomplete(_) => {
                KindqlError::parse(self.span(""), "Unexpected end of input")
            }
        }
    }
}

fn snippet(rest: &str) -> String {
    let line = rest.lines().next().unwrap_or("");
    line.chars().take(24).collect::<String>().trim_end().to_string()
}
