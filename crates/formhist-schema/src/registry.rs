//! Field registry
//!
//! Provides [`FieldRegistry`] for looking up descriptors by data key while
//! keeping schema order.

use crate::descriptor::FieldDescriptor;
use indexmap::IndexMap;

/// Descriptors of one schema, indexed by name
#[derive(Debug, Default, Clone)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldDescriptor>,
}

impl FieldRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Register a descriptor, replacing any previous one with the same name
    pub fn register(&mut self, field: FieldDescriptor) {
        self.fields.insert(field.name.clone(), field);
    }

    /// Get descriptor by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Check if a field exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Display label of a data key; the key itself when unknown
    #[must_use]
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).map_or(name, FieldDescriptor::display_name)
    }

    /// Get number of registered fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over descriptors in schema order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }
}

impl FromIterator<FieldDescriptor> for FieldRegistry {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for field in iter {
            registry.register(field);
        }
        registry
    }
}

impl From<Vec<FieldDescriptor>> for FieldRegistry {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        fields.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::FieldKind;

    fn sample() -> FieldRegistry {
        vec![
            FieldDescriptor::new("b", FieldKind::Text).with_title("Bee"),
            FieldDescriptor::new("a", FieldKind::Numeric),
        ]
        .into()
    }

    #[test]
    fn registry_new_empty() {
        let registry = FieldRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_lookup() {
        let registry = sample();
        assert!(registry.contains("a"));
        assert_eq!(registry.get("a").map(|f| f.kind), Some(FieldKind::Numeric));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn registry_display_name() {
        let registry = sample();
        assert_eq!(registry.display_name("b"), "Bee");
        assert_eq!(registry.display_name("a"), "a");
        assert_eq!(registry.display_name("unknown"), "unknown");
    }

    #[test]
    fn registry_keeps_schema_order() {
        let registry = sample();
        let names: Vec<_> = registry.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn registry_register_replaces() {
        let mut registry = sample();
        registry.register(FieldDescriptor::new("a", FieldKind::Boolean));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").map(|f| f.kind), Some(FieldKind::Boolean));
    }
}
