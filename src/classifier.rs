//! Decides whether a closure body is a query block.
//!
//! Statements are scanned in order. Bare keywords and keyword calls keep the
//! scan going; anything else stops it. A block is a query block when an
//! acceptable `from` call was seen before the scan stopped.

use serde::Serialize;

use crate::ast::{BinaryOp, Block, Expr, ExprKind};
use crate::compiler::{Keyword, Representation};
use crate::compiler::keywords::is_keyword;
use crate::resolver::simple_name;

/// Result type named by `from marker as Type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedFrom {
    /// Type as written, possibly qualified.
    pub type_name: String,
    /// Last path segment of `type_name`.
    pub kind: String,
    pub representation: Representation,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    /// Index of the first `from` statement.
    pub from_index: usize,
    pub typed_from: Option<TypedFrom>,
}

/// Classify `block`; `None` means it is ordinary code.
pub fn classify(block: &Block) -> Option<Classification> {
    let mut found = None;
    for (index, stmt) in block.statements.iter().enumerate() {
        let Some(expr) = stmt.as_expr() else {
            break;
        };
        match &expr.kind {
            ExprKind::Variable(name) if is_keyword(name) => {}
            ExprKind::Call {
                object: None,
                method,
                args,
            } => match Keyword::parse(method) {
                Some(Keyword::From) if found.is_none() => {
                    if let Some(typed_from) = acceptable_from(args) {
                        found = Some(Classification {
                            from_index: index,
                            typed_from,
                        });
                    }
                }
                Some(_) => {}
                None => break,
            },
            _ => break,
        }
    }
    found
}

/// `Some(typed)` when `args` is a usable `from` argument list.
fn acceptable_from(args: &[Expr]) -> Option<Option<TypedFrom>> {
    if args.is_empty() || args.len() > 2 {
        return None;
    }
    match &args[0].kind {
        ExprKind::Variable(_) => Some(None),
        ExprKind::Call { object: None, .. } => Some(None),
        ExprKind::Binary {
            op: BinaryOp::Assign,
            ..
        } => Some(None),
        ExprKind::Cast { expr, ty } => {
            let representation = Representation::from_marker(expr.as_variable()?)?;
            Some(Some(TypedFrom {
                type_name: ty.clone(),
                kind: simple_name(ty).to_string(),
                representation,
            }))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_block;

    fn classify_source(source: &str) -> Option<Classification> {
        classify(&parse_block(source).unwrap())
    }

    #[test]
    fn test_plain_from() {
        let classification = classify_source("select all\nfrom Person\nwhere age > 3").unwrap();
        assert_eq!(classification.from_index, 1);
        assert_eq!(classification.typed_from, None);
    }

    #[test]
    fn test_typed_from() {
        let classification = classify_source("From Bean as com.acme.Person").unwrap();
        assert_eq!(
            classification.typed_from,
            Some(TypedFrom {
                type_name: "com.acme.Person".to_string(),
                kind: "Person".to_string(),
                representation: Representation::Pojo,
            })
        );
    }

    #[test]
    fn test_ancestor_forms() {
        assert!(classify_source("from childOf = key").is_some());
        assert!(classify_source("from parent(key)").is_some());
    }

    #[test]
    fn test_block_without_from_is_not_a_query() {
        assert_eq!(classify_source("select all\nwhere age > 3"), None);
        assert_eq!(classify_source(""), None);
    }

    #[test]
    fn test_rejected_from_arguments() {
        assert_eq!(classify_source("from thing as Person"), None);
        assert_eq!(classify_source("from 'Person'"), None);
        assert_eq!(classify_source("from a, b, c"), None);
        assert_eq!(classify_source("from"), None);
    }

    #[test]
    fn test_scan_stops_at_foreign_statement() {
        assert_eq!(classify_source("println 'hi'\nfrom Person"), None);
        assert_eq!(classify_source("def x = 1\nfrom Person"), None);
        assert_eq!(classify_source("total\nfrom Person"), None);
    }

    #[test]
    fn test_foreign_statement_after_from_keeps_block() {
        let classification = classify_source("from Person\nprintln 'hi'").unwrap();
        assert_eq!(classification.from_index, 0);
    }
}
