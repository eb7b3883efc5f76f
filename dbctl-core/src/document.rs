//! Open document handling
//!
//! Components are kept as order-preserving JSON maps so that fields this
//! crate knows nothing about survive untouched. The helpers below give typed
//! access into that tree and report a [`ShapeError`] instead of panicking
//! when the tree does not have the expected shape.

use crate::{Error, Result};
use serde_json::{Map, Value};

/// One component record, an open map of fields
pub type Component = Map<String, Value>;

/// Any open document (manifest, remote resource)
pub type Document = Value;

/// A field that is missing or has the wrong type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{path}' must be {expected}, found {found}")]
pub struct ShapeError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl ShapeError {
    fn new(path: impl Into<String>, expected: &'static str, found: Option<&Value>) -> Self {
        Self {
            path: path.into(),
            expected,
            found: found.map(kind_of).unwrap_or("nothing"),
        }
    }
}

/// Human name of a value's type, used in error messages
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

/// Parse a YAML components document into component records.
///
/// Merge keys (`<<`) are expanded, then the YAML tree is converted to a JSON
/// value tree (key order kept), which must be a list of maps. Values JSON
/// cannot carry, such as `.inf` or `.nan`, fail the whole document.
pub fn normalize(raw: &[u8]) -> Result<Vec<Component>> {
    let mut yaml: serde_yaml::Value =
        serde_yaml::from_slice(raw).map_err(|e| Error::Format(e.to_string()))?;
    expand_merge_keys(&mut yaml)?;
    reject_non_finite(&yaml, "")?;
    let tree = serde_json::to_value(&yaml).map_err(|e| Error::Format(e.to_string()))?;

    let items = match tree {
        Value::Array(items) => items,
        Value::Null => return Err(Error::Format("document is empty".to_string())),
        other => {
            return Err(Error::Format(format!(
                "expected a list of components, found {}",
                kind_of(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(component) => Ok(component),
            other => Err(Error::Format(format!(
                "component {} must be a map, found {}",
                i,
                kind_of(&other)
            ))),
        })
        .collect()
}

// Keys written out win over merged ones, and merged keys follow them in order.
fn expand_merge_keys(value: &mut serde_yaml::Value) -> Result<()> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Mapping(map) => {
            if let Some(merge) = map.shift_remove("<<") {
                let sources = match merge {
                    Yaml::Mapping(source) => vec![source],
                    Yaml::Sequence(items) => items
                        .into_iter()
                        .map(|item| match item {
                            Yaml::Mapping(source) => Ok(source),
                            _ => Err(Error::Format(
                                "merge key '<<' must list only maps".to_string(),
                            )),
                        })
                        .collect::<Result<Vec<_>>>()?,
                    _ => {
                        return Err(Error::Format(
                            "merge key '<<' must be a map or a list of maps".to_string(),
                        ))
                    }
                };
                for source in sources {
                    for (key, item) in source {
                        if !map.contains_key(&key) {
                            map.insert(key, item);
                        }
                    }
                }
            }
            map.values_mut().try_for_each(expand_merge_keys)
        }
        Yaml::Sequence(items) => items.iter_mut().try_for_each(expand_merge_keys),
        Yaml::Tagged(tagged) => expand_merge_keys(&mut tagged.value),
        _ => Ok(()),
    }
}

fn reject_non_finite(value: &serde_yaml::Value, path: &str) -> Result<()> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Number(n) if n.is_nan() || n.is_infinite() => Err(Error::Format(format!(
            "field '{}' holds {}, which is not a finite number",
            path, n
        ))),
        Yaml::Sequence(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| reject_non_finite(item, &format!("{}[{}]", path, i))),
        Yaml::Mapping(map) => map.iter().try_for_each(|(key, item)| {
            let key = match key {
                Yaml::String(s) => s.clone(),
                Yaml::Number(n) => n.to_string(),
                Yaml::Bool(b) => b.to_string(),
                _ => "?".to_string(),
            };
            let path = if path.is_empty() {
                key
            } else {
                format!("{}.{}", path, key)
            };
            reject_non_finite(item, &path)
        }),
        Yaml::Tagged(tagged) => reject_non_finite(&tagged.value, path),
        _ => Ok(()),
    }
}

/// Look up a string at `path`, `None` when absent or not a string
pub fn nested_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .and_then(Value::as_str)
}

/// Walk `path` from `map`, creating empty maps along the way
pub fn nested_map_mut<'a>(
    map: &'a mut Map<String, Value>,
    path: &[&str],
) -> std::result::Result<&'a mut Map<String, Value>, ShapeError> {
    let mut current = map;
    for (i, key) in path.iter().enumerate() {
        match current
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
        {
            Value::Object(next) => current = next,
            other => return Err(ShapeError::new(path[..=i].join("."), "a map", Some(&*other))),
        }
    }
    Ok(current)
}

/// Set `value` at `path`, creating intermediate maps as needed
pub fn set_nested(
    map: &mut Map<String, Value>,
    path: &[&str],
    value: Value,
) -> std::result::Result<(), ShapeError> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };
    nested_map_mut(map, parents)?.insert(last.to_string(), value);
    Ok(())
}

/// Borrow every entry of the list at `key` as a map.
///
/// Fails when the field is missing, is not a list, or holds a non-map entry.
pub fn list_of_maps_mut<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> std::result::Result<Vec<&'a mut Map<String, Value>>, ShapeError> {
    let list = match map.get_mut(key) {
        Some(Value::Array(list)) => list,
        other => return Err(ShapeError::new(key, "a list of maps", other.map(|v| &*v))),
    };

    list.iter_mut()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("{}[{}]", key, i);
            match item {
                Value::Object(entry) => Ok(entry),
                other => Err(ShapeError::new(path, "a map", Some(&*other))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_keeps_field_order_and_unknown_fields() {
        let raw = b"- name: wesql\n  type: wesql\n  zeta: 1\n  alpha:\n    nested: true\n";
        let components = normalize(raw).unwrap();

        assert_eq!(components.len(), 1);
        let keys: Vec<&str> = components[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "type", "zeta", "alpha"]);
        assert_eq!(components[0]["alpha"], json!({"nested": true}));
    }

    #[test]
    fn test_normalize_accepts_flow_style() {
        let raw = br#"[{name: "c1", type: "t1", volumeClaimTemplates: [{spec: {}}]}]"#;
        let components = normalize(raw).unwrap();
        assert_eq!(components[0]["volumeClaimTemplates"], json!([{"spec": {}}]));
    }

    #[test]
    fn test_normalize_rejects_malformed_yaml() {
        let err = normalize(b"- name: [unterminated\n").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_normalize_rejects_non_finite_numbers() {
        let err = normalize(b"- name: c1\n  replicas: .inf\n").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(err.to_string().contains("field '[0].replicas'"), "{}", err);

        let err = normalize(b"- name: c1\n  resources:\n    limits: [1, -.inf]\n").unwrap_err();
        assert!(err.to_string().contains("field '[0].resources.limits[1]'"), "{}", err);

        assert!(normalize(b"- ratio: .nan\n").is_err());
        assert!(normalize(b"- ratio: 0.5\n").is_ok());
    }

    #[test]
    fn test_normalize_expands_merge_keys() {
        let raw = b"- name: c1\n  base: &b {a: 1}\n  other:\n    <<: *b\n    c: 2\n";
        let components = normalize(raw).unwrap();

        assert_eq!(components[0]["other"], json!({"a": 1, "c": 2}));
        assert!(components[0]["other"].get("<<").is_none());
    }

    #[test]
    fn test_normalize_rejects_scalar_merge() {
        let err = normalize(b"- name: c1\n  <<: 5\n").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_normalize_merge_keeps_component_field_order() {
        let raw = b"- &defaults\n  type: wesql\n  replicas: 1\n- <<: *defaults\n  name: c2\n  replicas: 3\n";
        let components = normalize(raw).unwrap();

        assert_eq!(components[1]["type"], "wesql");
        assert_eq!(components[1]["replicas"], 3);
        let keys: Vec<&str> = components[1].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "replicas", "type"]);
    }

    #[test]
    fn test_normalize_rejects_non_list_document() {
        let err = normalize(b"name: wesql\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed components document: expected a list of components, found a map"
        );
    }

    #[test]
    fn test_normalize_rejects_scalar_component() {
        let err = normalize(b"- name: ok\n- just-a-string\n").unwrap_err();
        assert!(err.to_string().contains("component 1 must be a map, found a string"));
    }

    #[test]
    fn test_normalize_rejects_empty_document() {
        assert!(matches!(normalize(b"").unwrap_err(), Error::Format(_)));
    }

    #[test]
    fn test_nested_str() {
        let doc = json!({"spec": {"backupType": "snapshot", "count": 3}});
        assert_eq!(nested_str(&doc, &["spec", "backupType"]), Some("snapshot"));
        assert_eq!(nested_str(&doc, &["spec", "count"]), None);
        assert_eq!(nested_str(&doc, &["status", "phase"]), None);
    }

    #[test]
    fn test_set_nested_creates_intermediate_maps() {
        let mut map = Map::new();
        set_nested(&mut map, &["spec", "dataSource", "name"], json!("snap1")).unwrap();
        assert_eq!(Value::Object(map), json!({"spec": {"dataSource": {"name": "snap1"}}}));
    }

    #[test]
    fn test_set_nested_refuses_non_map_parent() {
        let mut map = json!({"spec": "oops"}).as_object().cloned().unwrap();
        let err = set_nested(&mut map, &["spec", "dataSource"], json!({})).unwrap_err();
        assert_eq!(err.to_string(), "field 'spec' must be a map, found a string");
    }

    #[test]
    fn test_list_of_maps_mut_reports_shape() {
        let mut missing = Map::new();
        let err = list_of_maps_mut(&mut missing, "volumeClaimTemplates").unwrap_err();
        assert_eq!(err.found, "nothing");

        let mut bad_entry = json!({"volumeClaimTemplates": [{"spec": {}}, 7]})
            .as_object()
            .cloned()
            .unwrap();
        let err = list_of_maps_mut(&mut bad_entry, "volumeClaimTemplates").unwrap_err();
        assert_eq!(err.path, "volumeClaimTemplates[1]");
        assert_eq!(err.found, "a number");
    }
}
