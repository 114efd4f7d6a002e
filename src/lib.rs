//! # kindql — datastore query blocks for host scripts
//!
//! kindql finds `datastore.executeQuery { ... }` blocks in a script, checks
//! the query statements inside against the rules of the datastore query
//! engine, and rewrites each block into plain code that builds and runs the
//! query.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use kindql::prelude::*;
//!
//! let source = r#"
//! def adults = datastore.executeQuery {
//!     select all, limit(10)
//!     from Person
//!     where age >= 18
//!     orderBy age as DESC
//! }
//! "#;
//! let output = kindql::transform_source(source, &TransformConfig::default())?;
//! assert!(output.report.diagnostics.is_empty());
//! // output.source now builds a Query, adds the filter and sort, and fetches a list
//! ```
//!
//! ## Query statements
//!
//! | Statement      | Arguments                                         |
//! |----------------|---------------------------------------------------|
//! | `select`       | `all`, `keys`, `single` or `count`; `limit`, `offset` |
//! | `cursor`       | `all` or `keys`; `startCursor`, `endCursor`, `limit` |
//! | `from`         | `Kind`, `pojo as Type`, `entity as Type`, `childOf = key` |
//! | `where`        | `field op value` with `==`, `!=`, `<`, `<=`, `>`, `>=`, `in` |
//! | `orderBy`      | `field` or `field as DESC`                        |
//! | `fetchOptions` | `chunkSize`, `prefetchSize`                       |

pub mod ast;
pub mod classifier;
pub mod compiler;
pub mod config;
pub mod emitter;
pub mod error;
pub mod fmt;
pub mod parser;
pub mod recognizer;
pub mod resolver;
pub mod transform;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::compiler::{Clause, Compiler, QuerySpec, SelectionMode};
    pub use crate::config::TransformConfig;
    pub use crate::error::*;
    pub use crate::parser::{HostParser, ScriptParser, parse_block, parse_module};
    pub use crate::resolver::{FieldSet, ModuleResolver, NoResolver, TypeResolver};
    pub use crate::transform::{
        TransformOutput, TransformReport, transform_module, transform_source,
    };
}

pub use transform::transform_source;

/// Parse a host script into a module.
///
/// # Example
///
/// ```
/// let module = kindql::parse("def total = 1").unwrap();
/// assert_eq!(module.items.len(), 1);
/// ```
pub fn parse(input: &str) -> error::KindqlResult<ast::Module> {
    parser::parse_module(input)
}
