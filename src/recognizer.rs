//! Finds query call sites in a module.
//!
//! A call site is `receiver.method { ... }` where the receiver and method
//! names come from [`TransformConfig`] and the only argument is a closure.
//! Field initializers, method bodies and top-level statements are searched;
//! methods listed in `skip_methods` are not.

use crate::ast::visit::{VisitMut, walk_expr_mut, walk_module_mut};
use crate::ast::{Closure, Expr, ExprKind, MethodNode, Module, Span};
use crate::config::TransformConfig;

/// Receives every matched call site.
pub trait CallSiteHandler {
    /// `closure` may be rewritten in place.
    fn handle(&mut self, site: CallSite<'_>, closure: &mut Closure);
}

/// Where a query closure was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    pub receiver: &'a str,
    pub method: &'a str,
    pub span: Span,
}

pub struct Recognizer<'a, H> {
    config: &'a TransformConfig,
    handler: H,
    matched: usize,
}

impl<'a, H: CallSiteHandler> Recognizer<'a, H> {
    pub fn new(config: &'a TransformConfig, handler: H) -> Self {
        Self {
            config,
            handler,
            matched: 0,
        }
    }

    /// Walk `module`, handing each call site to the handler.
    pub fn run(mut self, module: &mut Module) -> H {
        walk_module_mut(&mut self, module);
        tracing::debug!(call_sites = self.matched, "recognizer finished");
        self.handler
    }

    fn is_receiver(&self, name: &str) -> bool {
        self.config.receivers.iter().any(|r| r == name)
    }

    fn is_entry_method(&self, name: &str) -> bool {
        self.config.methods.iter().any(|m| m == name)
    }
}

impl<H: CallSiteHandler> VisitMut for Recognizer<'_, H> {
    fn visit_method_mut(&mut self, method: &mut MethodNode) {
        if self.config.skip_methods.contains(&method.name) {
            tracing::trace!(method = %method.name, "skipping method");
            return;
        }
        self.visit_block_mut(&mut method.body);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        let span = expr.span;
        if let ExprKind::Call {
            object: Some(object),
            method,
            args,
        } = &mut expr.kind
            && let ExprKind::Variable(receiver) = &object.kind
            && self.is_receiver(receiver)
            && self.is_entry_method(method.as_str())
            && let [Expr {
                kind: ExprKind::Closure(closure),
                ..
            }] = args.as_mut_slice()
        {
            tracing::debug!(%receiver, %method, line = span.line, "query call site");
            self.matched += 1;
            let site = CallSite {
                receiver: receiver.as_str(),
                method: method.as_str(),
                span,
            };
            self.handler.handle(site, closure);
            return;
        }
        walk_expr_mut(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;

    #[derive(Default)]
    struct Collect {
        sites: Vec<(String, String, usize)>,
    }

    impl CallSiteHandler for Collect {
        fn handle(&mut self, site: CallSite<'_>, closure: &mut Closure) {
            self.sites.push((
                site.receiver.to_string(),
                site.method.to_string(),
                closure.body.statements.len(),
            ));
        }
    }

    fn sites(source: &str) -> Vec<(String, String, usize)> {
        let mut module = parse_module(source).unwrap();
        let config = TransformConfig::default();
        Recognizer::new(&config, Collect::default())
            .run(&mut module)
            .sites
    }

    #[test]
    fn test_finds_call_sites_everywhere() {
        let source = r#"
class PersonDao {
  def adults = datastore.executeQuery {
    from Person
    where age >= 18
  }

  def byName(String name) {
    return Entitystore.defineQuery {
      from Person
    }
  }
}

def everyone = datastore.executeQuery { from Person }
"#;
        assert_eq!(
            sites(source),
            vec![
                ("datastore".to_string(), "executeQuery".to_string(), 2),
                ("Entitystore".to_string(), "defineQuery".to_string(), 1),
                ("datastore".to_string(), "executeQuery".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_call_sites_compare_without_spans() {
        let first = CallSite {
            receiver: "datastore",
            method: "executeQuery",
            span: Span::new(2, 13),
        };
        let moved = CallSite {
            span: Span::new(40, 1),
            ..first
        };
        assert_eq!(first, moved);
        assert_ne!(first, CallSite { method: "defineQuery", ..first });
    }

    #[test]
    fn test_ignores_other_shapes() {
        let source = r#"
other.executeQuery { from Person }
datastore.execute { from Person }
datastore.executeQuery({ from Person }, 10)
datastore.executeQuery(query)
executeQuery { from Person }
"#;
        assert!(sites(source).is_empty());
    }

    #[test]
    fn test_skips_main() {
        let source = r#"
static main(String[] args) {
  datastore.executeQuery { from Person }
}
"#;
        assert!(sites(source).is_empty());
    }

    #[test]
    fn test_nested_call_sites_are_not_descended() {
        let source = "datastore.executeQuery {\n  from Person\n  where id in datastore.executeQuery { from Other }\n}";
        assert_eq!(sites(source).len(), 1);
    }

    #[test]
    fn test_configured_names() {
        let config = TransformConfig::builder()
            .receivers(["store"])
            .methods(["query"])
            .build()
            .unwrap();
        let mut module =
            parse_module("store.query { from Person }\ndatastore.executeQuery { from Person }")
                .unwrap();
        let found = Recognizer::new(&config, Collect::default()).run(&mut module).sites;
        assert_eq!(found, vec![("store".to_string(), "query".to_string(), 1)]);
    }
}
