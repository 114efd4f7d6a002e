//! Best-effort lookup of a query's result type.
//!
//! Only used to improve diagnostics: a type that cannot be resolved disables
//! the field checks instead of failing the compilation.

use std::collections::{BTreeSet, HashMap};

use strsim::levenshtein;

use crate::ast::Module;
use crate::config::TransformConfig;

/// Declared field names of a result type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    type_name: String,
    fields: BTreeSet<String>,
}

impl FieldSet {
    pub fn new<I, S>(type_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Simple name of the type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Closest declared field to `field`, if any is close enough.
    pub fn suggest(&self, field: &str) -> Option<&str> {
        let threshold = match field.len() {
            0..=2 => 0,
            3..=5 => 2,
            _ => 3,
        };
        self.fields
            .iter()
            .map(|candidate| (levenshtein(field, candidate), candidate))
            .filter(|(dist, _)| *dist <= threshold)
            .min_by_key(|(dist, _)| *dist)
            .map(|(_, candidate)| candidate.as_str())
    }
}

/// Port used by the compiler to look up result types.
pub trait TypeResolver {
    /// Field set of `type_name`; `None` skips the field checks.
    fn resolve(&self, type_name: &str) -> Option<FieldSet>;

    /// Whether `type_name` names a type at all.
    fn knows(&self, _type_name: &str) -> bool {
        true
    }
}

/// Resolves nothing and accepts every type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl TypeResolver for NoResolver {
    fn resolve(&self, _type_name: &str) -> Option<FieldSet> {
        None
    }
}

/// Types declared by classes of the compiled module and by configuration.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    types: HashMap<String, FieldSet>,
    strict: bool,
}

impl ModuleResolver {
    pub fn new(strict: bool) -> Self {
        Self {
            types: HashMap::new(),
            strict,
        }
    }

    pub fn from_module(module: &Module, config: &TransformConfig) -> Self {
        let mut resolver = Self::new(config.strict_types);
        for (name, fields) in &config.types {
            resolver.insert(FieldSet::new(simple_name(name), fields.iter().cloned()));
        }
        for class in module.classes() {
            let fields = class.fields.iter().map(|f| f.name.clone());
            resolver.insert(FieldSet::new(class.name.clone(), fields));
        }
        tracing::debug!(types = resolver.types.len(), "collected result types");
        resolver
    }

    pub fn insert(&mut self, fields: FieldSet) {
        self.types.insert(fields.type_name.clone(), fields);
    }
}

impl TypeResolver for ModuleResolver {
    fn resolve(&self, type_name: &str) -> Option<FieldSet> {
        self.types.get(simple_name(type_name)).cloned()
    }

    fn knows(&self, type_name: &str) -> bool {
        !self.strict || self.types.contains_key(simple_name(type_name))
    }
}

/// Last segment of a dotted type name.
pub fn simple_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;

    #[test]
    fn test_suggest_closest_field() {
        let fields = FieldSet::new("Person", ["firstName", "lastName", "age"]);
        assert_eq!(fields.suggest("firstname"), Some("firstName"));
        assert_eq!(fields.suggest("agee"), Some("age"));
        assert_eq!(fields.suggest("zz"), None);
    }

    #[test]
    fn test_module_classes_are_resolved() {
        let module = parse_module("class Person {\n  String name\n  int age\n}").unwrap();
        let resolver = ModuleResolver::from_module(&module, &TransformConfig::default());
        let person = resolver.resolve("com.acme.Person").unwrap();
        assert!(person.contains("age"));
        assert!(!person.contains("email"));
        assert!(resolver.resolve("Car").is_none());
        assert!(!resolver.knows("Car"));
    }

    #[test]
    fn test_lenient_resolver_knows_every_type() {
        let config = TransformConfig::builder().strict_types(false).build().unwrap();
        let resolver = ModuleResolver::from_module(&Default::default(), &config);
        assert!(resolver.knows("Boat"));
        assert!(resolver.resolve("Boat").is_none());
    }

    #[test]
    fn test_strict_resolver_rejects_unknown_types() {
        let config = TransformConfig::builder()
            .with_type("Car", ["wheels"])
            .build()
            .unwrap();
        let resolver = ModuleResolver::from_module(&Default::default(), &config);
        assert!(resolver.knows("Car"));
        assert!(!resolver.knows("Boat"));
    }

    #[test]
    fn test_no_resolver() {
        assert!(NoResolver.resolve("Person").is_none());
        assert!(NoResolver.knows("Anything"));
    }
}
