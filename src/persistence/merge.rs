//! Deep merge of JSON values
//!
//! Objects merge key by key, recursively. Everything else (numbers, strings,
//! booleans, null, arrays) replaces the target wholesale: arrays in a save
//! always fully replace the default array.

use serde_json::{Map, Value};

/// Overlay `source` onto `target`. A non-object `source` leaves `target`
/// untouched.
pub fn merge_into(target: &mut Value, source: &Value) {
    let Value::Object(src) = source else {
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(dst) = target {
        merge_maps(dst, src);
    }
}

fn merge_maps(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, sv) in source {
        match sv {
            Value::Object(nested) => {
                let tv = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !tv.is_object() {
                    *tv = Value::Object(Map::new());
                }
                if let Value::Object(tv) = tv {
                    merge_maps(tv, nested);
                }
            }
            _ => {
                target.insert(key.clone(), sv.clone());
            }
        }
    }
}

/// Drop top-level `keys` from an object value
pub fn strip_keys<S: AsRef<str>>(value: &mut Value, keys: &[S]) {
    if let Value::Object(map) = value {
        for key in keys {
            map.remove(key.as_ref());
        }
    }
}
