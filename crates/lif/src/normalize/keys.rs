use serde_json::{Map, Value};

/// Historical key spellings and their canonical names, applied at every depth.
pub const KEY_RENAMES: &[(&str, &str)] = &[
    ("albedo", "image"),
    ("disparity", "inv_z_map"),
    ("inv_z_dist", "inv_z_map"),
    ("max_disparity", "max"),
    ("min_disparity", "min"),
    ("inv_z_dist_min", "min"),
    ("inv_z_dist_max", "max"),
    ("width_px", "width"),
    ("height_px", "height"),
    ("focal_px", "f"),
    ("layers_top_to_bottom", "layers"),
    ("frustum_skew", "sk"),
    ("rotation_slant", "sl"),
];

#[inline]
pub fn canonical_key(key: &str) -> &str {
    KEY_RENAMES
        .iter()
        .find(|(from, _)| *from == key)
        .map_or(key, |(_, to)| to)
}

/// Returns a copy of `value` with every key renamed to its canonical spelling.
///
/// Objects keyed by the indices `"0".."n-1"` are turned back into arrays. When a renamed key
/// collides with one already spelled canonically, the canonical one is kept.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());

            for (key, child) in map.iter().filter(|(k, _)| canonical_key(k) == k.as_str()) {
                out.insert(key.clone(), canonicalize(child));
            }
            for (key, child) in map.iter().filter(|(k, _)| canonical_key(k) != k.as_str()) {
                let renamed = canonical_key(key);
                if out.contains_key(renamed) {
                    log::debug!("dropping '{key}': '{renamed}' already present");
                    continue;
                }
                out.insert(renamed.to_owned(), canonicalize(child));
            }

            rematerialize_array(out)
        }
        other => other.clone(),
    }
}

fn rematerialize_array(map: Map<String, Value>) -> Value {
    let n = map.len();
    let is_index_keyed = n > 0
        && map
            .keys()
            .all(|k| k.parse::<usize>().is_ok_and(|i| i < n && i.to_string() == *k));

    if !is_index_keyed {
        return Value::Object(map);
    }

    let mut slots: Vec<Value> = vec![Value::Null; n];
    for (key, child) in map {
        // Keys are unique and in 0..n, so every slot is filled exactly once.
        if let Ok(i) = key.parse::<usize>() {
            slots[i] = child;
        }
    }
    Value::Array(slots)
}
