//! Header union over heterogeneous property sets.

use crate::models::PropertyMap;
use std::collections::BTreeSet;

/// Accumulates the sorted union of property keys for one category.
///
/// Keys equal to one of the table's reserved columns are dropped, since the
/// reserved columns always lead the header and carry identifiers. Node and
/// relationship tables reserve different columns, so the caller passes the
/// set for the kind being written.
#[derive(Debug, Clone, Default)]
pub struct SchemaAggregator {
    reserved: Vec<String>,
    keys: BTreeSet<String>,
    dropped: BTreeSet<String>,
}

impl SchemaAggregator {
    /// Creates an empty aggregator for a table reserving `reserved`.
    #[must_use]
    pub fn new(reserved: &[&str]) -> Self {
        Self {
            reserved: reserved.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Builds the union over every entity's properties.
    #[must_use]
    pub fn from_entities<'a>(
        entities: impl IntoIterator<Item = &'a PropertyMap>,
        reserved: &[&str],
    ) -> Self {
        let mut aggregator = Self::new(reserved);
        for properties in entities {
            aggregator.observe(properties);
        }
        aggregator
    }

    /// Adds the keys of one entity's properties.
    pub fn observe(&mut self, properties: &PropertyMap) {
        for key in properties.keys() {
            if self.reserved.contains(key) {
                if self.dropped.insert(key.clone()) {
                    tracing::warn!(key = %key, "Property shadows a reserved column and is not exported");
                }
            } else if !self.keys.contains(key) {
                self.keys.insert(key.clone());
            }
        }
    }

    /// Returns the property columns in lexicographic order.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }

    /// Returns the reserved-name keys that were seen and dropped.
    #[must_use]
    pub fn dropped(&self) -> Vec<String> {
        self.dropped.iter().cloned().collect()
    }
}

/// Computes the header union for a set of property maps.
#[must_use]
pub fn header_union<'a>(
    entities: impl IntoIterator<Item = &'a PropertyMap>,
    reserved: &[&str],
) -> Vec<String> {
    SchemaAggregator::from_entities(entities, reserved).columns()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IoConfig;
    use crate::models::PropertyValue;

    fn props(keys: &[&str]) -> PropertyMap {
        keys.iter()
            .map(|k| ((*k).to_string(), PropertyValue::Integer(1)))
            .collect()
    }

    #[test]
    fn test_union_is_sorted() {
        let entities = [props(&["name"]), props(&["age", "name"]), props(&["city"])];
        assert_eq!(header_union(&entities, &["id"]), ["age", "city", "name"]);
    }

    #[test]
    fn test_union_ignores_order() {
        let forward = [props(&["b", "a"]), props(&["c"])];
        let backward = [props(&["c"]), props(&["a", "b"])];
        assert_eq!(header_union(&forward, &["id"]), header_union(&backward, &["id"]));
    }

    #[test]
    fn test_node_tables_keep_endpoint_names() {
        let config = IoConfig::default();
        let schema = SchemaAggregator::from_entities(
            [&props(&["id", "name", "source", "destination"])],
            &config.node_reserved_columns(),
        );
        assert_eq!(schema.columns(), ["destination", "name", "source"]);
        assert_eq!(schema.dropped(), ["id"]);
    }

    #[test]
    fn test_relationship_tables_keep_id() {
        let config = IoConfig::default();
        let schema = SchemaAggregator::from_entities(
            [&props(&["id", "since", "source"])],
            &config.relationship_reserved_columns(),
        );
        assert_eq!(schema.columns(), ["id", "since"]);
        assert_eq!(schema.dropped(), ["source"]);
    }

    #[test]
    fn test_empty() {
        let schema = SchemaAggregator::new(&["id"]);
        assert!(schema.columns().is_empty());
        assert!(schema.dropped().is_empty());
    }
}
