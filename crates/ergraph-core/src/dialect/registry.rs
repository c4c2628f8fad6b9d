use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::{Dialect, GenericDialect, PostgresDialect};

/// Registry of dialects, built explicitly at start-up and passed to whoever
/// needs a lookup.
#[derive(Debug, Default, Clone)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the generic and PostgreSQL dialects.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GenericDialect::standard()));
        registry.register(Arc::new(PostgresDialect::new()));
        registry
    }

    /// Register a dialect under its unique name, replacing any previous one.
    pub fn register(&mut self, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(dialect.name().to_string(), dialect);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        self.dialects
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownDialect(name.to_string()))
    }

    /// Registered dialects ordered by name.
    pub fn supported(&self) -> impl Iterator<Item = &Arc<dyn Dialect>> {
        self.dialects.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.dialects.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = DialectRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["generic", "postgres"]);
        assert_eq!(registry.get("postgres").unwrap().name(), "postgres");
    }

    #[test]
    fn unknown_dialect_is_an_error() {
        let registry = DialectRegistry::new();
        assert!(matches!(registry.get("oracle"), Err(Error::UnknownDialect(_))));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut registry = DialectRegistry::with_builtins();
        registry.register(Arc::new(GenericDialect::new("generic")));
        assert!(registry.get("generic").unwrap().data_types().is_empty());
    }
}
