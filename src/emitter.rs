//! Code generator for compiled query blocks.
//!
//! Output is host script text in three parts: a prologue declaring the
//! internal slots, one fragment per [`Clause`] in source order, and an
//! epilogue that prepares the query and fetches by selection mode. Every slot
//! name carries the configured suffix so user variables of the enclosing
//! scope are never shadowed. The text is meant to be parsed back with the
//! host parser and spliced in as the new closure body.

use std::fmt::{Result, Write};

use crate::compiler::{
    Clause, FetchParam, Filter, QuerySpec, SelectionMode, Setting, Sort,
};
use crate::config::TransformConfig;
use crate::error::KindqlResult;
use crate::fmt::quote;

/// Query class constructed by the `from` fragment.
pub const QUERY_CLASS: &str = "com.google.appengine.api.datastore.Query";

/// Internal slots declared by the prologue, in declaration order.
const SLOTS: &[&str] = &[
    "markerProperty",
    "whereFields",
    "orderByFields",
    "pojo",
    "pojoClass",
    "entity",
    "fetchOptions",
    "select",
    "cursor",
    "kind",
    "all",
    "keys",
    "single",
    "count",
    "ancestorKey",
    "limit",
    "offset",
    "chunkSize",
    "prefetchSize",
    "deadLine",
    "startCursor",
    "endCursor",
    "childOf",
    "query",
    "preparedQuery",
];

const MODES: &[SelectionMode] = &[
    SelectionMode::All,
    SelectionMode::Keys,
    SelectionMode::Single,
    SelectionMode::Count,
];

pub struct Emitter<'a> {
    config: &'a TransformConfig,
    indent_level: usize,
    buffer: String,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a TransformConfig) -> Self {
        Self {
            config,
            indent_level: 0,
            buffer: String::new(),
        }
    }

    /// Generate the replacement body for `spec`.
    pub fn emit(mut self, spec: &QuerySpec) -> KindqlResult<String> {
        self.prologue()?;
        for clause in &spec.clauses {
            self.clause(clause)?;
        }
        self.epilogue()?;
        Ok(self.buffer)
    }

    fn slot(&self, name: &str) -> String {
        self.config.slot(name)
    }

    fn indent(&mut self) -> Result {
        for _ in 0..self.indent_level {
            write!(self.buffer, "  ")?;
        }
        Ok(())
    }

    fn line(&mut self, text: &str) -> Result {
        self.indent()?;
        writeln!(self.buffer, "{}", text)
    }

    fn assign(&mut self, name: &str, value: &str) -> Result {
        let slot = self.slot(name);
        self.line(&format!("{} = {}", slot, value))
    }

    /// `if (cond) {`, the body one level deeper, then `}`.
    fn guarded(&mut self, cond: &str, body: impl FnOnce(&mut Self) -> Result) -> Result {
        self.line(&format!("if ({}) {{", cond))?;
        self.indent_level += 1;
        body(self)?;
        self.indent_level -= 1;
        self.line("}")
    }

    fn prologue(&mut self) -> Result {
        for name in SLOTS {
            let init = match *name {
                "whereFields" | "orderByFields" => "\"\"",
                "fetchOptions" => "FetchOptions.Builder.withDefaults()",
                _ => "null",
            };
            let slot = self.slot(name);
            self.line(&format!("def {} = {}", slot, init))?;
        }
        Ok(())
    }

    fn clause(&mut self, clause: &Clause) -> Result {
        match clause {
            Clause::Select { mode, settings } => {
                self.assign("select", "\"select\"")?;
                self.assign("cursor", "null")?;
                if let Some(mode) = mode {
                    self.mode(*mode)?;
                }
                self.settings(settings)
            }
            Clause::Cursor { mode, settings } => {
                self.assign("cursor", "\"cursor\"")?;
                self.assign("select", "null")?;
                self.mode(*mode)?;
                self.settings(settings)
            }
            Clause::From {
                kind,
                type_name,
                representation,
                ancestor,
            } => {
                match kind {
                    Some(kind) => self.assign("kind", &quote(kind))?,
                    None => self.assign("kind", "null")?,
                }
                if let Some(type_name) = type_name {
                    self.assign("pojoClass", type_name)?;
                }
                if let Some(representation) = representation {
                    self.assign("pojo", &quote(representation.as_str()))?;
                }
                self.assign("childOf", ancestor.as_deref().unwrap_or("null"))?;
                self.create_query()
            }
            Clause::Where { filters } => {
                for filter in filters {
                    self.filter(filter)?;
                }
                Ok(())
            }
            Clause::OrderBy { sorts } => {
                for sort in sorts {
                    self.sort(sort)?;
                }
                Ok(())
            }
            Clause::FetchOptions { settings } => {
                self.settings(settings)?;
                let fetch_options = self.slot("fetchOptions");
                for param in [FetchParam::ChunkSize, FetchParam::PrefetchSize] {
                    let slot = self.slot(param.as_str());
                    self.guarded(&slot, |e| {
                        e.line(&format!("{}.{}({})", fetch_options, param, slot))
                    })?;
                }
                Ok(())
            }
        }
    }

    /// Mark `mode` in its slot and clear the other mode slots.
    fn mode(&mut self, mode: SelectionMode) -> Result {
        for candidate in MODES {
            let value = if *candidate == mode {
                quote(candidate.as_str())
            } else {
                "null".to_string()
            };
            self.assign(candidate.as_str(), &value)?;
        }
        Ok(())
    }

    /// Store each setting; `limit` and `offset` go straight to the fetch options.
    fn settings(&mut self, settings: &[Setting]) -> Result {
        let fetch_options = self.slot("fetchOptions");
        for setting in settings {
            self.assign(setting.param.as_str(), &setting.value)?;
            if matches!(setting.param, FetchParam::Limit | FetchParam::Offset) {
                let slot = self.slot(setting.param.as_str());
                self.line(&format!("{}.{}({})", fetch_options, setting.param, slot))?;
            }
        }
        Ok(())
    }

    fn create_query(&mut self) -> Result {
        let kind = self.slot("kind");
        let query = self.slot("query");
        let child_of = self.slot("childOf");
        let keys = self.slot("keys");

        self.line(&format!("if ({}) {{", kind))?;
        self.nested_line(&format!("{} = new {}({})", query, QUERY_CLASS, kind))?;
        self.line("} else {")?;
        self.nested_line(&format!("{} = new {}()", query, QUERY_CLASS))?;
        self.line("}")?;

        self.guarded(&child_of, |e| {
            e.line(&format!("if ({} instanceof Key) {{", child_of))?;
            e.nested_line(&format!("{}.setAncestor({})", query, child_of))?;
            e.line("} else {")?;
            e.nested_line(&format!("{}.setAncestor({}.key)", query, child_of))?;
            e.line("}")
        })?;
        self.guarded(&keys, |e| e.line(&format!("{}.setKeysOnly()", query)))
    }

    fn nested_line(&mut self, text: &str) -> Result {
        self.indent_level += 1;
        self.line(text)?;
        self.indent_level -= 1;
        Ok(())
    }

    fn property_name(&self, field: &str) -> String {
        if field == self.config.key_property {
            format!("Entity.{}", self.config.key_property)
        } else {
            quote(field)
        }
    }

    fn filter(&mut self, filter: &Filter) -> Result {
        let where_fields = self.slot("whereFields");
        self.line(&format!("{} += \",{}\"", where_fields, filter.field))?;
        let query = self.slot("query");
        let property = self.property_name(&filter.field);
        self.line(&format!(
            "{}.addFilter({}, Query.FilterOperator.{}, {})",
            query,
            property,
            filter.operator.token(),
            filter.value
        ))
    }

    fn sort(&mut self, sort: &Sort) -> Result {
        let order_by_fields = self.slot("orderByFields");
        self.line(&format!("{} += \",{}\"", order_by_fields, sort.field))?;
        let query = self.slot("query");
        let property = self.property_name(&sort.field);
        self.line(&format!(
            "{}.addSort({}, Query.SortDirection.{})",
            query,
            property,
            sort.direction.token()
        ))
    }

    /// Turn a serialized cursor into a cursor value before it reaches the fetch options.
    fn convert_cursor(&mut self, param: FetchParam) -> Result {
        let slot = self.slot(param.as_str());
        let fetch_options = self.slot("fetchOptions");
        self.guarded(&slot, |e| {
            e.line(&format!(
                "if ({slot} instanceof String && {slot}.trim() != \"null\" && !{slot}.trim().isEmpty()) {{"
            ))?;
            e.nested_line(&format!(
                "{}.{}(Cursor.fromWebSafeString({}))",
                fetch_options, param, slot
            ))?;
            e.line(&format!("}} else if ({} instanceof Cursor) {{", slot))?;
            e.nested_line(&format!("{}.{}({})", fetch_options, param, slot))?;
            e.line("}")
        })
    }

    fn epilogue(&mut self) -> Result {
        let prepared = self.slot("preparedQuery");
        let fetch_options = self.slot("fetchOptions");
        let query = self.slot("query");
        self.line(&format!("{} = it.prepare({})", prepared, query))?;

        let cursor = self.slot("cursor");
        self.line(&format!("if ({}) {{", cursor))?;
        self.indent_level += 1;
        self.convert_cursor(FetchParam::StartCursor)?;
        self.convert_cursor(FetchParam::EndCursor)?;
        self.line(&format!("{}.asQueryResultList({})", prepared, fetch_options))?;
        self.indent_level -= 1;

        let dispatch = [
            (SelectionMode::All, format!("{}.asList({})", prepared, fetch_options)),
            (
                SelectionMode::Count,
                format!("{}.countEntities({})", prepared, fetch_options),
            ),
            (SelectionMode::Single, format!("{}.asSingleEntity()", prepared)),
        ];
        for (mode, fetch) in dispatch {
            let slot = self.slot(mode.as_str());
            self.line(&format!("}} else if ({}) {{", slot))?;
            self.nested_line(&fetch)?;
        }
        self.line("} else {")?;
        self.nested_line(&format!("{}.asList({})", prepared, fetch_options))?;
        self.line("}")
    }
}

/// Generate the replacement body for `spec` with `config`'s slot names.
pub fn emit(spec: &QuerySpec, config: &TransformConfig) -> KindqlResult<String> {
    Emitter::new(config).emit(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, StmtKind};
    use crate::compiler::Compiler;
    use crate::error::Diagnostics;
    use crate::parser::parse_block;
    use crate::resolver::NoResolver;

    fn compile_and_emit(source: &str, config: &TransformConfig) -> String {
        let block = parse_block(source).unwrap();
        let mut diagnostics = Diagnostics::new();
        let spec = Compiler::new(config, &NoResolver, &mut diagnostics).compile(&block);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        emit(&spec, config).unwrap()
    }

    fn lines(code: &str) -> Vec<&str> {
        code.lines().map(str::trim).collect()
    }

    #[test]
    fn test_prologue_declares_every_slot() {
        let code = emit(&QuerySpec::new(), &TransformConfig::default()).unwrap();
        let block = parse_block(&code).unwrap();
        let declared: Vec<&str> = block
            .statements
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Declare { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(declared.len(), SLOTS.len());
        assert!(declared.iter().all(|name| name.ends_with("__kql")));
        assert!(
            lines(&code).contains(&"def fetchOptions__kql = FetchOptions.Builder.withDefaults()")
        );
        assert!(lines(&code).contains(&"def whereFields__kql = \"\""));
    }

    #[test]
    fn test_select_all_with_limit() {
        let code =
            compile_and_emit("select all, limit(10)\nfrom Person", &TransformConfig::default());
        let lines = lines(&code);
        for expected in [
            "select__kql = \"select\"",
            "all__kql = \"all\"",
            "keys__kql = null",
            "limit__kql = 10",
            "fetchOptions__kql.limit(limit__kql)",
            "kind__kql = \"Person\"",
            "query__kql = new com.google.appengine.api.datastore.Query(kind__kql)",
            "query__kql = new com.google.appengine.api.datastore.Query()",
            "preparedQuery__kql = it.prepare(query__kql)",
            "} else if (all__kql) {",
            "preparedQuery__kql.asList(fetchOptions__kql)",
        ] {
            assert!(lines.contains(&expected), "missing `{}` in\n{}", expected, code);
        }
        assert!(parse_block(&code).is_ok());
    }

    #[test]
    fn test_filters_and_sorts() {
        let code = compile_and_emit(
            "from entity as Person\nwhere age > 5, age < 10, KEY_RESERVED_PROPERTY == k\norderBy age as DESC",
            &TransformConfig::default(),
        );
        let lines = lines(&code);
        for expected in [
            "pojoClass__kql = Person",
            "pojo__kql = \"entity\"",
            "whereFields__kql += \",age\"",
            "query__kql.addFilter(\"age\", Query.FilterOperator.GREATER_THAN, 5)",
            "query__kql.addFilter(\"age\", Query.FilterOperator.LESS_THAN, 10)",
            "query__kql.addFilter(Entity.KEY_RESERVED_PROPERTY, Query.FilterOperator.EQUAL, k)",
            "query__kql.addSort(\"age\", Query.SortDirection.DESCENDING)",
        ] {
            assert!(lines.contains(&expected), "missing `{}` in\n{}", expected, code);
        }
    }

    #[test]
    fn test_fragments_follow_clause_order() {
        let code = compile_and_emit(
            "from Person\nwhere name == 'a'\nselect count",
            &TransformConfig::default(),
        );
        let filter = code.find("addFilter").unwrap();
        let select = code.find("select__kql = \"select\"").unwrap();
        let create = code.find("new com.google").unwrap();
        assert!(create < filter);
        assert!(filter < select);
    }

    #[test]
    fn test_cursor_fragment_and_conversion() {
        let code = compile_and_emit(
            "cursor keys, startCursor = token, endCursor(stop)\nfrom Person",
            &TransformConfig::default(),
        );
        let lines = lines(&code);
        for expected in [
            "cursor__kql = \"cursor\"",
            "select__kql = null",
            "keys__kql = \"keys\"",
            "startCursor__kql = token",
            "endCursor__kql = stop",
            "fetchOptions__kql.startCursor(Cursor.fromWebSafeString(startCursor__kql))",
            "fetchOptions__kql.endCursor(endCursor__kql)",
            "preparedQuery__kql.asQueryResultList(fetchOptions__kql)",
            "query__kql.setKeysOnly()",
        ] {
            assert!(lines.contains(&expected), "missing `{}` in\n{}", expected, code);
        }
        assert!(parse_block(&code).is_ok());
    }

    #[test]
    fn test_fetch_options_are_guarded() {
        let code = compile_and_emit(
            "from Person\nfetchOptions chunkSize = 50",
            &TransformConfig::default(),
        );
        let lines = lines(&code);
        assert!(lines.contains(&"chunkSize__kql = 50"));
        assert!(lines.contains(&"if (chunkSize__kql) {"));
        assert!(lines.contains(&"fetchOptions__kql.chunkSize(chunkSize__kql)"));
        assert!(lines.contains(&"fetchOptions__kql.prefetchSize(prefetchSize__kql)"));
    }

    #[test]
    fn test_kindless_ancestor() {
        let code = compile_and_emit("from childOf = parent.key", &TransformConfig::default());
        let lines = lines(&code);
        assert!(lines.contains(&"kind__kql = null"));
        assert!(lines.contains(&"childOf__kql = parent.key"));
        assert!(lines.contains(&"if (childOf__kql instanceof Key) {"));
        assert!(lines.contains(&"query__kql.setAncestor(childOf__kql.key)"));
    }

    #[test]
    fn test_epilogue_dispatch_order() {
        let code = emit(&QuerySpec::new(), &TransformConfig::default()).unwrap();
        let block = parse_block(&code).unwrap();
        let Some(last) = block.statements.last() else {
            panic!("empty output");
        };
        let StmtKind::If { cond, otherwise, .. } = &last.kind else {
            panic!("expected dispatch on the cursor slot");
        };
        assert_eq!(cond.as_variable(), Some("cursor__kql"));

        let mut branches = vec![];
        let mut next = otherwise.as_ref();
        while let Some(block) = next {
            match block.statements.as_slice() {
                [stmt] => match &stmt.kind {
                    StmtKind::If { cond, otherwise, .. } => {
                        branches.push(cond.as_variable().unwrap_or_default().to_string());
                        next = otherwise.as_ref();
                    }
                    StmtKind::Expr(expr) => {
                        let ExprKind::Call { method, .. } = &expr.kind else {
                            panic!("expected fetch call");
                        };
                        branches.push(method.clone());
                        next = None;
                    }
                    _ => panic!("unexpected statement"),
                },
                _ => panic!("unexpected branch"),
            }
        }
        assert_eq!(branches, vec!["all__kql", "count__kql", "single__kql", "asList"]);
    }

    #[test]
    fn test_custom_suffix() {
        let config = TransformConfig::builder().suffix("_q7").build().unwrap();
        let code = compile_and_emit("from Person", &config);
        assert!(code.contains("def query_q7 = null"));
        assert!(!code.contains("__kql"));
    }
}
