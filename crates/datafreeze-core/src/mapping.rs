//! Name overrides declared as `efcore:` annotations on columns.
//!
//! An annotation is one comment line `efcore:<Namespace>=<ClassName>.<PropertyName>`.
//! The set is sorted once when built, so "first match" is always the first
//! mapping in `(schema, table, column position, namespace)` order.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::identifier::is_plain_identifier;

/// Annotation key prefix recognized by default.
pub const DEFAULT_ANNOTATION_PREFIX: &str = "efcore:";

/// One column-level name override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMapping {
    pub schema: String,
    pub table: String,
    pub column: String,
    /// Ordinal position of the annotated column, used for ordering.
    pub column_position: i16,
    /// Namespace from the annotation key; may be empty.
    pub namespace: String,
    pub class_name: String,
    pub property_name: String,
}

/// Parse every annotation line of one column comment.
///
/// Lines that do not start with `prefix` are ordinary comment text and are
/// skipped silently; prefixed lines with a malformed value are skipped with a
/// warning.
pub fn parse_annotation(
    prefix: &str,
    schema: &str,
    table: &str,
    column: &str,
    column_position: i16,
    comment: &str,
) -> Vec<NameMapping> {
    let mut mappings = Vec::new();

    for line in comment.lines() {
        let Some(body) = line.trim().strip_prefix(prefix) else {
            continue;
        };
        let Some((namespace, target)) = body.split_once('=') else {
            warn!(schema, table, column, annotation = line, "annotation without '=' ignored");
            continue;
        };
        let namespace = namespace.trim();
        if !namespace.is_empty() && !namespace.split('.').all(is_plain_identifier) {
            warn!(schema, table, column, namespace, "annotation namespace is not a valid name");
            continue;
        }
        let Some((class_name, property_name)) = parse_target(target.trim()) else {
            warn!(
                schema,
                table,
                column,
                annotation = line,
                "annotation value must look like ClassName.PropertyName"
            );
            continue;
        };

        mappings.push(NameMapping {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            column_position,
            namespace: namespace.to_string(),
            class_name,
            property_name,
        });
    }

    mappings
}

fn parse_target(value: &str) -> Option<(String, String)> {
    let re = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)$").ok()?;
    let caps = re.captures(value)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Read-only lookup from schema objects to generated names.
#[derive(Debug, Clone, Default)]
pub struct MappingSet {
    mappings: Vec<NameMapping>,
    classes: HashMap<(String, String), usize>,
    properties: HashMap<(String, String, String), usize>,
}

impl MappingSet {
    pub fn new(mut mappings: Vec<NameMapping>) -> Self {
        mappings.sort_by(|left, right| {
            left.schema
                .cmp(&right.schema)
                .then_with(|| left.table.cmp(&right.table))
                .then_with(|| left.column_position.cmp(&right.column_position))
                .then_with(|| left.namespace.cmp(&right.namespace))
                .then_with(|| left.column.cmp(&right.column))
        });

        let mut classes = HashMap::new();
        let mut properties = HashMap::new();
        for (idx, mapping) in mappings.iter().enumerate() {
            classes
                .entry((mapping.schema.clone(), mapping.table.clone()))
                .or_insert(idx);
            properties
                .entry((
                    mapping.schema.clone(),
                    mapping.table.clone(),
                    mapping.column.clone(),
                ))
                .or_insert(idx);
        }

        Self {
            mappings,
            classes,
            properties,
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Namespace of the first mapping that declares one.
    pub fn namespace(&self) -> Option<&str> {
        self.mappings
            .iter()
            .map(|mapping| mapping.namespace.as_str())
            .find(|namespace| !namespace.is_empty())
    }

    /// Class name override for a table.
    pub fn class_name(&self, schema: &str, table: &str) -> Option<&str> {
        self.classes
            .get(&(schema.to_string(), table.to_string()))
            .map(|idx| self.mappings[*idx].class_name.as_str())
    }

    /// Property name override for a column.
    pub fn property_name(&self, schema: &str, table: &str, column: &str) -> Option<&str> {
        self.properties
            .get(&(schema.to_string(), table.to_string(), column.to_string()))
            .map(|idx| self.mappings[*idx].property_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(table: &str, column: &str, position: i16, namespace: &str, target: &str) -> NameMapping {
        let (class_name, property_name) = target.split_once('.').unwrap();
        NameMapping {
            schema: "app".to_string(),
            table: table.to_string(),
            column: column.to_string(),
            column_position: position,
            namespace: namespace.to_string(),
            class_name: class_name.to_string(),
            property_name: property_name.to_string(),
        }
    }

    #[test]
    fn parses_prefixed_lines_only() {
        let comment = "Customer display name\nefcore:Shop.Models=Customer.FullName\n";
        let parsed = parse_annotation(DEFAULT_ANNOTATION_PREFIX, "app", "users", "full_name", 3, comment);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].namespace, "Shop.Models");
        assert_eq!(parsed[0].class_name, "Customer");
        assert_eq!(parsed[0].property_name, "FullName");
    }

    #[test]
    fn splits_value_on_first_dot_and_rejects_malformed_targets() {
        let comment = "efcore:Shop=Customer\nefcore:Shop=Customer.Full.Name\nefcore:Shop=1Bad.Name\nefcore:Shop Customer.Name";
        let parsed = parse_annotation(DEFAULT_ANNOTATION_PREFIX, "app", "users", "name", 2, comment);
        assert!(parsed.is_empty());
    }

    #[test]
    fn allows_empty_namespace() {
        let parsed = parse_annotation(
            DEFAULT_ANNOTATION_PREFIX,
            "app",
            "users",
            "id",
            1,
            "  efcore: = Customer.Id  ",
        );
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].namespace, "");
    }

    #[test]
    fn first_mapping_in_column_order_wins_the_class_name() {
        let set = MappingSet::new(vec![
            mapping("users", "email", 2, "Shop", "Account.Email"),
            mapping("users", "id", 1, "Shop", "Customer.Id"),
        ]);
        assert_eq!(set.class_name("app", "users"), Some("Customer"));
        assert_eq!(set.property_name("app", "users", "email"), Some("Email"));
        assert_eq!(set.property_name("app", "users", "id"), Some("Id"));
    }

    #[test]
    fn missing_columns_resolve_to_none() {
        let set = MappingSet::new(vec![mapping("users", "id", 1, "", "Customer.Key")]);
        assert_eq!(set.class_name("app", "users"), Some("Customer"));
        assert_eq!(set.property_name("app", "users", "email"), None);
        assert_eq!(set.class_name("app", "orders"), None);
        assert_eq!(set.property_name("app", "orders", "id"), None);
        assert_eq!(set.namespace(), None);
    }

    #[test]
    fn namespace_comes_from_first_declaring_mapping() {
        let set = MappingSet::new(vec![
            mapping("users", "id", 1, "", "Customer.Id"),
            mapping("users", "name", 2, "Shop.Models", "Customer.Name"),
            mapping("addresses", "id", 1, "Other", "Address.Id"),
        ]);
        assert_eq!(set.namespace(), Some("Other"));
        assert_eq!(set.len(), 3);
    }
}
