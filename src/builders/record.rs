//! TL-006: Nested record helpers — pure transformations over YAML mappings.
//!
//! Every builder is a function from records to records; these helpers do the
//! path walking. Paths address mapping keys only.

use serde_yaml_ng::{Mapping, Value};

/// Build a mapping from key/value pairs.
pub fn mapping(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = Mapping::new();
    for (key, value) in pairs {
        map.insert(Value::String(key.to_string()), value);
    }
    Value::Mapping(map)
}

/// Read a nested value by path.
pub fn get_in<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    Some(current)
}

/// Replace the value at a nested path, creating intermediate mappings. A
/// non-mapping intermediate is replaced by a mapping.
pub fn set_in(value: Value, path: &[&str], new: Value) -> Value {
    update_in(value, path, |_| new)
}

/// Apply a function to the value at a nested path (Null if absent),
/// creating intermediate mappings.
pub fn update_in<F>(value: Value, path: &[&str], f: F) -> Value
where
    F: FnOnce(Value) -> Value,
{
    match path.split_first() {
        None => f(value),
        Some((head, rest)) => {
            let mut map = match value {
                Value::Mapping(map) => map,
                _ => Mapping::new(),
            };
            let key = Value::String((*head).to_string());
            let child = map.remove(&key).unwrap_or(Value::Null);
            map.insert(key, update_in(child, rest, f));
            Value::Mapping(map)
        }
    }
}

/// Append an item to the sequence at a nested path, creating it if absent.
pub fn push_in(value: Value, path: &[&str], item: Value) -> Value {
    update_in(value, path, |existing| {
        let mut seq = match existing {
            Value::Sequence(seq) => seq,
            _ => Vec::new(),
        };
        seq.push(item);
        Value::Sequence(seq)
    })
}
