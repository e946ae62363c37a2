use serde_json::Value;

use crate::normalize::first_text;
use logscope_types::{Module, Schema};

/// The shapes a module-list response has been seen to take
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModuleListShape<'a> {
    /// `null`, `[]`, `""` or `{}`
    Empty,
    /// `["login", "logout"]`
    Names(&'a [Value]),
    /// `[{"id": .., "name": .., "schema_id": ..}]`
    Records(&'a [Value]),
    /// `{"modules": [...]}`; holds the inner array
    Wrapped(&'a Value),
    Unrecognized,
}

impl<'a> ModuleListShape<'a> {
    /// Classify a response by its outer shape and first element
    pub fn classify(raw: &'a Value) -> Self {
        match raw {
            Value::Null => Self::Empty,
            Value::String(s) if s.is_empty() => Self::Empty,
            Value::Array(items) => match items.first() {
                None => Self::Empty,
                Some(Value::String(_)) => Self::Names(items),
                Some(Value::Object(_)) => Self::Records(items),
                Some(_) => Self::Unrecognized,
            },
            Value::Object(map) => match map.get("modules") {
                Some(inner @ Value::Array(_)) => Self::Wrapped(inner),
                Some(_) => Self::Unrecognized,
                None if map.is_empty() => Self::Empty,
                None => Self::Unrecognized,
            },
            _ => Self::Unrecognized,
        }
    }
}

/// Normalize a module-list response. Total: unknown shapes yield no modules.
pub fn normalize_modules(raw: &Value, schema_id: &str) -> Vec<Module> {
    match ModuleListShape::classify(raw) {
        ModuleListShape::Empty | ModuleListShape::Unrecognized => Vec::new(),
        ModuleListShape::Names(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                item.as_str()
                    .map(|name| Module::new(format!("module_{}", index), name, schema_id))
            })
            .collect(),
        ModuleListShape::Records(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| module_from_record(item, index, schema_id))
            .collect(),
        ModuleListShape::Wrapped(inner) => normalize_modules(inner, schema_id),
    }
}

fn module_from_record(item: &Value, index: usize, schema_id: &str) -> Option<Module> {
    let obj = item.as_object();
    let name = first_text(obj, &["name", "Name"])?;
    let id = first_text(obj, &["id", "ID", "Id"]).unwrap_or_else(|| format!("module_{}", index));
    let owner = first_text(obj, &["schema_id", "schemaId", "SchemaID"])
        .unwrap_or_else(|| schema_id.to_string());
    Some(Module::new(id, name, owner))
}

/// Normalize a schema-list response. Entries without an id are dropped; a
/// missing name falls back to the id.
pub fn normalize_schemas(raw: &Value) -> Vec<Schema> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object();
            let id = first_text(obj, &["id", "ID", "Id"])?;
            let name = first_text(obj, &["name", "Name"]).unwrap_or_else(|| id.clone());
            Some(Schema::new(id, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_inputs() {
        assert!(normalize_modules(&json!([]), "s1").is_empty());
        assert!(normalize_modules(&json!(null), "s1").is_empty());
        assert!(normalize_modules(&json!({}), "s1").is_empty());
        assert!(normalize_modules(&json!(""), "s1").is_empty());
    }

    #[test]
    fn test_string_array() {
        let modules = normalize_modules(&json!(["a", "b"]), "s1");
        assert_eq!(
            modules,
            vec![Module::new("module_0", "a", "s1"), Module::new("module_1", "b", "s1")]
        );
    }

    #[test]
    fn test_object_array_passes_through() {
        let raw = json!([
            {"id": "m1", "name": "login", "schema_id": "s9"},
            {"id": 2, "name": "logout", "schemaId": "s9"}
        ]);
        let modules = normalize_modules(&raw, "s1");
        assert_eq!(
            modules,
            vec![Module::new("m1", "login", "s9"), Module::new("2", "logout", "s9")]
        );
    }

    #[test]
    fn test_object_array_fills_gaps() {
        let raw = json!([{"name": "login"}, {"id": "x"}]);
        let modules = normalize_modules(&raw, "s1");
        assert_eq!(modules, vec![Module::new("module_0", "login", "s1")]);
    }

    #[test]
    fn test_wrapped_modules() {
        let raw = json!({"modules": ["error", "user"]});
        let modules = normalize_modules(&raw, "s2");
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[1], Module::new("module_1", "user", "s2"));
    }

    #[test]
    fn test_unrecognized_shapes() {
        let raw = json!({"items": ["a"]});
        assert_eq!(ModuleListShape::classify(&raw), ModuleListShape::Unrecognized);
        assert!(normalize_modules(&raw, "s1").is_empty());
        assert!(normalize_modules(&json!([1, 2]), "s1").is_empty());
        assert!(normalize_modules(&json!({"modules": "a"}), "s1").is_empty());
        assert!(normalize_modules(&json!(7), "s1").is_empty());
    }

    #[test]
    fn test_normalize_schemas() {
        let raw = json!([
            {"id": "1", "name": "login"},
            {"ID": 2, "Name": "action"},
            {"id": 3},
            {"name": "orphan"}
        ]);
        let schemas = normalize_schemas(&raw);
        assert_eq!(
            schemas,
            vec![
                Schema::new("1", "login"),
                Schema::new("2", "action"),
                Schema::new("3", "3"),
            ]
        );
        assert!(normalize_schemas(&json!({"schemas": []})).is_empty());
    }
}
