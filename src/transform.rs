//! Pipeline driver: recognize, classify, compile, emit, re-parse, replace.

use serde::Serialize;

use crate::ast::{Closure, Module, Span};
use crate::classifier::{Classification, classify};
use crate::compiler::{Compiler, QuerySpec};
use crate::config::TransformConfig;
use crate::emitter::emit;
use crate::error::{Diagnostics, KindqlResult};
use crate::fmt::print_module;
use crate::parser::{HostParser, ScriptParser, parse_module};
use crate::recognizer::{CallSite, CallSiteHandler, Recognizer};
use crate::resolver::{ModuleResolver, TypeResolver};

/// One rewritten query block.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledQuery {
    pub span: Span,
    pub receiver: String,
    pub method: String,
    pub classification: Classification,
    pub spec: QuerySpec,
    /// Generated replacement body.
    pub code: String,
}

/// Outcome of transforming one module.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformReport {
    pub diagnostics: Diagnostics,
    pub queries: Vec<CompiledQuery>,
}

impl TransformReport {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Rewritten source text plus its report.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub source: String,
    pub report: TransformReport,
}

/// Handles recognized call sites by replacing their closure bodies.
pub struct QueryTransformer<'a> {
    config: &'a TransformConfig,
    resolver: &'a dyn TypeResolver,
    parser: &'a dyn HostParser,
    report: TransformReport,
}

impl<'a> QueryTransformer<'a> {
    pub fn new(
        config: &'a TransformConfig,
        resolver: &'a dyn TypeResolver,
        parser: &'a dyn HostParser,
    ) -> Self {
        Self {
            config,
            resolver,
            parser,
            report: TransformReport::default(),
        }
    }

    pub fn into_report(self) -> TransformReport {
        self.report
    }
}

impl CallSiteHandler for QueryTransformer<'_> {
    fn handle(&mut self, site: CallSite<'_>, closure: &mut Closure) {
        let Some(classification) = classify(&closure.body) else {
            tracing::debug!(line = site.span.line, "closure is not a query block");
            return;
        };

        let before = self.report.diagnostics.len();
        let spec = Compiler::new(self.config, self.resolver, &mut self.report.diagnostics)
            .compile(&closure.body);
        let errors = self.report.diagnostics.len() - before;
        if errors > 0 {
            tracing::warn!(line = site.span.line, errors, "query block has errors");
        }

        let code = match emit(&spec, self.config) {
            Ok(code) => code,
            Err(e) => {
                self.report
                    .diagnostics
                    .internal(format!("Failed to generate query code: {}", e), site.span);
                return;
            }
        };

        match self.parser.parse_block(&code) {
            Ok(body) => closure.body = body,
            Err(e) => {
                tracing::error!(error = %e, "generated code does not parse");
                self.report
                    .diagnostics
                    .internal(format!("Generated code does not parse: {}", e), site.span);
                return;
            }
        }

        tracing::info!(
            receiver = site.receiver,
            method = site.method,
            line = site.span.line,
            kind = spec.kind.as_deref().unwrap_or("<kindless>"),
            "rewrote query block"
        );
        self.report.queries.push(CompiledQuery {
            span: site.span,
            receiver: site.receiver.to_string(),
            method: site.method.to_string(),
            classification,
            spec,
            code,
        });
    }
}

/// Rewrite every query block of `module` in place.
pub fn transform_module(
    module: &mut Module,
    config: &TransformConfig,
    resolver: &dyn TypeResolver,
) -> TransformReport {
    let parser = ScriptParser;
    let transformer = QueryTransformer::new(config, resolver, &parser);
    Recognizer::new(config, transformer)
        .run(module)
        .into_report()
}

/// Parse `source`, rewrite its query blocks and print the result.
///
/// Types declared in `source` and in `config` are used to check field names.
pub fn transform_source(source: &str, config: &TransformConfig) -> KindqlResult<TransformOutput> {
    config.validate()?;
    let mut module = parse_module(source)?;
    let resolver = ModuleResolver::from_module(&module, config);
    let report = transform_module(&mut module, config, &resolver);
    let source = print_module(&module)?;
    Ok(TransformOutput { source, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, ExprKind, Item, StmtKind};
    use crate::error::{DiagnosticKind, KindqlError};

    struct FailingParser;

    impl HostParser for FailingParser {
        fn parse_block(&self, _source: &str) -> KindqlResult<Block> {
            Err(KindqlError::Reparse("rejected".to_string()))
        }
    }

    fn query_closure(module: &Module) -> &Closure {
        let Some(Item::Statement(stmt)) = module.items.first() else {
            panic!("expected a statement");
        };
        let StmtKind::Declare {
            init: Some(init), ..
        } = &stmt.kind
        else {
            panic!("expected a declaration");
        };
        let ExprKind::Call { args, .. } = &init.kind else {
            panic!("expected a call");
        };
        let [arg] = args.as_slice() else {
            panic!("expected one argument");
        };
        let ExprKind::Closure(closure) = &arg.kind else {
            panic!("expected a closure");
        };
        closure
    }

    #[test]
    fn test_replaces_closure_body() {
        let mut module =
            parse_module("def people = datastore.executeQuery { row ->\n  from Person\n}").unwrap();
        let report = transform_module(
            &mut module,
            &TransformConfig::default(),
            &ModuleResolver::new(false),
        );
        assert!(!report.has_errors());
        assert_eq!(report.queries.len(), 1);

        let closure = query_closure(&module);
        assert_eq!(closure.params, vec!["row".to_string()]);
        assert!(closure.body.statements.len() > 25);
    }

    #[test]
    fn test_non_query_closure_is_untouched() {
        let source = "def people = datastore.executeQuery {\n  println 'no query here'\n}";
        let mut module = parse_module(source).unwrap();
        let original = module.clone();
        let report = transform_module(
            &mut module,
            &TransformConfig::default(),
            &ModuleResolver::new(false),
        );
        assert!(report.queries.is_empty());
        assert!(report.diagnostics.is_empty());
        assert_eq!(module, original);
    }

    #[test]
    fn test_reparse_failure_is_reported() {
        let mut module =
            parse_module("def people = datastore.executeQuery {\n  from Person\n}").unwrap();
        let original = module.clone();
        let config = TransformConfig::default();
        let resolver = ModuleResolver::new(false);
        let parser = FailingParser;
        let transformer = QueryTransformer::new(&config, &resolver, &parser);
        let report = Recognizer::new(&config, transformer).run(&mut module).into_report();

        assert_eq!(report.diagnostics.count(DiagnosticKind::Internal), 1);
        assert!(report.queries.is_empty());
        assert_eq!(module, original);
    }

    #[test]
    fn test_blocks_with_errors_are_still_rewritten() {
        let mut module = parse_module(
            "def people = datastore.executeQuery {\n  from Person\n  where age > 1, height > 2\n}",
        )
        .unwrap();
        let report = transform_module(
            &mut module,
            &TransformConfig::default(),
            &ModuleResolver::new(false),
        );
        assert_eq!(report.diagnostics.count(DiagnosticKind::Semantic), 1);
        assert_eq!(report.queries.len(), 1);
    }

    #[test]
    fn test_transform_source_rejects_invalid_config() {
        let config = TransformConfig {
            suffix: "no spaces".to_string(),
            ..TransformConfig::default()
        };
        assert!(matches!(
            transform_source("def x = 1", &config),
            Err(KindqlError::Config(_))
        ));
    }
}
