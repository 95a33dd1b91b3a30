//! Layered configuration resolution.
//!
//! Operator configuration arrives in layers: pipeline-wide defaults, a
//! general block shared by every table, and a per-table block. Later layers
//! win. Objects merge key by key and recurse; scalars and arrays replace the
//! earlier value outright.

use serde_json::Value;

/// Merges `layers` left to right into one resolved object.
///
/// `null` layers are skipped, so absent manifest sections can be passed
/// straight through. With no effective layers the result is an empty object.
pub fn resolve_layers(layers: &[&Value]) -> Value {
    let mut resolved = Value::Object(serde_json::Map::new());
    for layer in layers {
        if layer.is_null() {
            continue;
        }
        merge_value(&mut resolved, layer);
    }
    resolved
}

fn merge_value(base: &mut Value, layer: &Value) {
    if let (Value::Object(base_map), Value::Object(layer_map)) = (&mut *base, layer) {
        for (key, value) in layer_map {
            match base_map.get_mut(key) {
                Some(existing) if existing.is_object() && value.is_object() => {
                    merge_value(existing, value);
                }
                _ => {
                    base_map.insert(key.clone(), value.clone());
                }
            }
        }
    } else {
        *base = layer.clone();
    }
}
