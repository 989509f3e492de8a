use serde_json::Value;

/// Overlays `overlay` onto `base`.
///
/// Keys present in `overlay` replace those in `base`; nested objects merge
/// recursively; arrays and scalars are replaced whole. Keys absent from
/// `overlay` are left as they are.
pub(crate) fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
