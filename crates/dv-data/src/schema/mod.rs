//! Column name resolution against a result schema
//!
//! Suggested names come from an upstream recommendation and may use a
//! dotted path (`traffic_source.source`) where the query actually flattened
//! the column to its leaf name. Only the flat top-level field list is
//! searched; members of nested structs are not resolvable this way.

use dv_core::Schema;
use tracing::debug;

/// Resolver for suggested column names against one schema
#[derive(Debug, Clone, Copy)]
pub struct ColumnNameResolver<'a> {
    schema: &'a Schema,
}

impl<'a> ColumnNameResolver<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Resolve a suggested name to an actual top-level column name.
    ///
    /// Tries an exact match first, then the segment after the last `.`.
    pub fn resolve(&self, suggested: &str) -> Option<&'a str> {
        if let Some(name) = self.exact(suggested) {
            return Some(name);
        }

        let resolved = suggested
            .rsplit_once('.')
            .and_then(|(_, leaf)| self.exact(leaf));

        if resolved.is_none() {
            debug!("Column '{}' not found in schema", suggested);
        }
        resolved
    }

    /// Resolve every name, dropping the ones that do not resolve
    pub fn resolve_all<'n>(&self, suggested: impl IntoIterator<Item = &'n str>) -> Vec<String> {
        suggested
            .into_iter()
            .filter_map(|name| self.resolve(name))
            .map(str::to_owned)
            .collect()
    }

    fn exact(&self, name: &str) -> Option<&'a str> {
        self.schema.field_names().find(|field| *field == name)
    }
}

/// Resolve `suggested` against `schema`. Absent inputs resolve to nothing.
pub fn actual_column_name<'a>(suggested: Option<&str>, schema: Option<&'a Schema>) -> Option<&'a str> {
    ColumnNameResolver::new(schema?).resolve(suggested?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dv_core::{FieldSchema, ScalarType};

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSchema::new("event_date", ScalarType::String),
            FieldSchema::new("source", ScalarType::String),
            FieldSchema::new("sessions", ScalarType::Integer),
            FieldSchema::structure(
                "device",
                vec![FieldSchema::new("category", ScalarType::String)],
            ),
        ])
    }

    #[test]
    fn test_exact_match() {
        let schema = schema();
        assert_eq!(actual_column_name(Some("sessions"), Some(&schema)), Some("sessions"));
    }

    #[test]
    fn test_dotted_path_falls_back_to_leaf() {
        let schema = schema();
        assert_eq!(
            actual_column_name(Some("traffic_source.source"), Some(&schema)),
            Some("source")
        );
        assert_eq!(actual_column_name(Some("a.b.sessions"), Some(&schema)), Some("sessions"));
    }

    #[test]
    fn test_misses() {
        let schema = schema();
        assert_eq!(actual_column_name(Some("nonexistent"), Some(&schema)), None);
        assert_eq!(actual_column_name(Some("traffic.medium"), Some(&schema)), None);
        assert_eq!(actual_column_name(Some("source."), Some(&schema)), None);
        // Nested struct members are not searched
        assert_eq!(actual_column_name(Some("category"), Some(&schema)), None);
        assert_eq!(actual_column_name(Some("device.category"), Some(&schema)), None);
    }

    #[test]
    fn test_absent_inputs() {
        let schema = schema();
        assert_eq!(actual_column_name(None, Some(&schema)), None);
        assert_eq!(actual_column_name(Some("source"), None), None);
    }

    #[test]
    fn test_resolve_all_drops_misses_and_keeps_order() {
        let schema = schema();
        let resolver = ColumnNameResolver::new(&schema);
        assert_eq!(
            resolver.resolve_all(["sessions", "nope", "x.source"]),
            vec!["sessions".to_string(), "source".to_string()]
        );
    }

    #[test]
    fn test_resolved_names_resolve_to_themselves() {
        let schema = schema();
        let resolver = ColumnNameResolver::new(&schema);
        let once = resolver.resolve("ga.source").unwrap();
        assert_eq!(resolver.resolve(once), Some(once));
    }
}
