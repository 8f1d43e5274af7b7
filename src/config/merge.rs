//! Deep merge of TOML tables.

/// Merge `overlay` into `base`.
///
/// Keys from `overlay` win. When both sides hold a table under the same key
/// the tables are merged key by key; any other value replaces the base value
/// wholesale, so arrays are never concatenated.
pub fn deep_merge(base: &mut toml::Table, overlay: &toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
