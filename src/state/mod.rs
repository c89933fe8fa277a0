//! Slice state shapes and the value operations reducers apply to them.
//!
//! A single slice holds `{ "value": {...} }`. A list slice additionally holds
//! `{ "list": [...], "total": n }`.

mod operations;

pub use operations::{
    as_index, as_sequence, deep_merge, insert_at, is_truthy, remove_at, replace_at, set_path,
    PropertyPath, MAX_INDEX_GAP,
};

use serde_json::{json, Value};

pub const VALUE_FIELD: &str = "value";
pub const LIST_FIELD: &str = "list";
pub const TOTAL_FIELD: &str = "total";

/// Empty single-slice state.
pub fn empty_single() -> Value {
    json!({ VALUE_FIELD: {} })
}

/// Empty list-slice state, without the single-slice fields.
pub fn empty_list() -> Value {
    json!({ LIST_FIELD: [], TOTAL_FIELD: 0 })
}

/// Mutable access to a top-level field, inserting `null` if absent.
///
/// Returns `None` when the state is not an object.
pub fn field_mut<'a>(state: &'a mut Value, name: &str) -> Option<&'a mut Value> {
    state
        .as_object_mut()
        .map(|fields| fields.entry(name).or_insert(Value::Null))
}

/// Mutable access to the `list` field, coercing it to an array.
pub fn list_mut(state: &mut Value) -> Option<&mut Vec<Value>> {
    let list = field_mut(state, LIST_FIELD)?;
    if !list.is_array() {
        *list = Value::Array(Vec::new());
    }
    list.as_array_mut()
}
