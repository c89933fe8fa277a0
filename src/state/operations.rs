//! Value-level operations the reducer is built from.
//!
//! These work on owned `serde_json::Value`s and never fail: malformed input
//! leaves the target untouched.

use serde_json::{Map, Value};

/// Largest gap of `null`s a path assignment may open past the end of an array.
pub const MAX_INDEX_GAP: usize = 1024;

/// Recursively merge `source` into `target`, right-biased.
///
/// Objects merge key by key and arrays merge index by index, so a shorter
/// source array overwrites a prefix of the target instead of replacing it.
/// A source that is not the same kind of container as the target is ignored.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(key) {
                    Some(slot) => merge_slot(slot, value),
                    None => {
                        dst.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(dst), Value::Array(src)) => {
            for (i, value) in src.iter().enumerate() {
                match dst.get_mut(i) {
                    Some(slot) => merge_slot(slot, value),
                    None => dst.push(value.clone()),
                }
            }
        }
        _ => {}
    }
}

fn merge_slot(slot: &mut Value, source: &Value) {
    let same_container = matches!(
        (&*slot, source),
        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
    );
    if same_container {
        deep_merge(slot, source);
    } else {
        *slot = source.clone();
    }
}

/// Property path such as `a.b[0].c` or `a["dotted.key"]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    pub fn new(segments: Vec<String>) -> Self {
        PropertyPath(segments)
    }

    /// Parse a dotted/bracketed path expression.
    ///
    /// The empty string names the `""` key.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return PropertyPath(vec![String::new()]);
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => segments.push(std::mem::take(&mut current)),
                '[' => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }

                    let quote = match chars.peek() {
                        Some('"') | Some('\'') => chars.next(),
                        _ => None,
                    };

                    let mut inner = String::new();
                    while let Some(c) = chars.next() {
                        match quote {
                            Some(_) if c == '\\' => {
                                if let Some(escaped) = chars.next() {
                                    inner.push(escaped);
                                }
                            }
                            Some(q) if c == q => {
                                // Skip to the closing bracket.
                                for c in chars.by_ref() {
                                    if c == ']' {
                                        break;
                                    }
                                }
                                break;
                            }
                            None if c == ']' => break,
                            _ => inner.push(c),
                        }
                    }

                    if quote.is_some() {
                        segments.push(inner);
                    } else {
                        segments.push(inner.trim().to_string());
                    }

                    if chars.peek() == Some(&'.') {
                        chars.next();
                    }
                }
                _ => current.push(c),
            }
        }

        if !current.is_empty() {
            segments.push(current);
        }

        PropertyPath(segments)
    }

    /// Read a path from an action payload: a path string or an array of
    /// segments. Anything else yields an empty path.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => PropertyPath(vec![n.to_string()]),
            Value::Array(items) => PropertyPath(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => PropertyPath::default(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for PropertyPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// Parse an array index segment. Leading zeros are not indices.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse().ok()
}

/// Assign `value` at `path` inside `target`, creating missing containers.
///
/// A missing or scalar intermediate becomes an array when the next segment is
/// an index and an object otherwise. Paths through a scalar root, non-index
/// keys on arrays, and indices more than [`MAX_INDEX_GAP`] past the end are
/// ignored.
pub fn set_path(target: &mut Value, path: &PropertyPath, value: Value) {
    set_segments(target, path.segments(), value);
}

fn set_segments(target: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    let slot = match target {
        Value::Object(map) => map.entry(head.clone()).or_insert(Value::Null),
        Value::Array(items) => {
            let Some(index) = parse_index(head) else {
                return;
            };
            if index > items.len() + MAX_INDEX_GAP {
                return;
            }
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        _ => return,
    };

    if rest.is_empty() {
        *slot = value;
        return;
    }

    if !slot.is_object() && !slot.is_array() {
        *slot = if parse_index(&rest[0]).is_some() {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }

    set_segments(slot, rest, value);
}

/// Truthiness: `null`, `false`, zero, NaN and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Integer reading of an index payload; fractions truncate toward zero.
pub fn as_index(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if let Some(u) = n.as_u64() {
        return Some(i64::try_from(u).unwrap_or(i64::MAX));
    }
    n.as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

/// Elements carried by a sequence payload.
///
/// Arrays are used as-is, a missing or `null` value is empty, anything else
/// is a single element.
pub fn as_sequence(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// Position of an existing element; negative counts from the end.
fn element_position(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let position = if index < 0 { len + index } else { index };
    if (0..len).contains(&position) {
        usize::try_from(position).ok()
    } else {
        None
    }
}

/// Splice `values` in at `index`, clamped into `0..=len`.
pub fn insert_at(list: &mut Vec<Value>, index: i64, values: Vec<Value>) {
    let len = list.len() as i64;
    let start = if index < 0 {
        (len + index).max(0)
    } else {
        index.min(len)
    } as usize;
    list.splice(start..start, values);
}

/// Replace the element at `index`. Out-of-range indices are ignored.
pub fn replace_at(list: &mut [Value], index: i64, value: Value) {
    if let Some(position) = element_position(index, list.len()) {
        list[position] = value;
    }
}

/// Remove the element at `index`. Out-of-range indices are ignored.
pub fn remove_at(list: &mut Vec<Value>, index: i64) {
    if let Some(position) = element_position(index, list.len()) {
        list.remove(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_objects() {
        let mut state = json!({"a": 1, "nested": {"x": 1, "y": 2}});
        deep_merge(&mut state, &json!({"b": 2, "nested": {"y": 3, "z": 4}}));
        assert_eq!(
            state,
            json!({"a": 1, "b": 2, "nested": {"x": 1, "y": 3, "z": 4}})
        );
    }

    #[test]
    fn test_merge_arrays_by_index() {
        let mut state = json!({"items": [1, 2, 3]});
        deep_merge(&mut state, &json!({"items": [9]}));
        assert_eq!(state, json!({"items": [9, 2, 3]}));

        let mut state = json!({"items": [1]});
        deep_merge(&mut state, &json!({"items": [7, 8]}));
        assert_eq!(state, json!({"items": [7, 8]}));
    }

    #[test]
    fn test_merge_objects_inside_arrays() {
        let mut state = json!({"rows": [{"id": 1, "name": "a"}]});
        deep_merge(&mut state, &json!({"rows": [{"name": "b"}]}));
        assert_eq!(state, json!({"rows": [{"id": 1, "name": "b"}]}));
    }

    #[test]
    fn test_merge_replaces_mismatched_kinds() {
        let mut state = json!({"a": {"x": 1}, "b": [1], "c": 3});
        deep_merge(&mut state, &json!({"a": 5, "b": {"k": 1}, "c": null}));
        assert_eq!(state, json!({"a": 5, "b": {"k": 1}, "c": null}));
    }

    #[test]
    fn test_merge_scalar_source_is_ignored() {
        let mut state = json!({"a": 1});
        deep_merge(&mut state, &json!(42));
        deep_merge(&mut state, &json!([1, 2]));
        assert_eq!(state, json!({"a": 1}));
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(PropertyPath::parse("a.b.c").segments(), ["a", "b", "c"]);
        assert_eq!(PropertyPath::parse("a[0].b").segments(), ["a", "0", "b"]);
        assert_eq!(PropertyPath::parse("a[\"x.y\"]").segments(), ["a", "x.y"]);
        assert_eq!(PropertyPath::parse("a['q\\'t'][1]").segments(), ["a", "q't", "1"]);
        assert_eq!(PropertyPath::parse("[2]").segments(), ["2"]);
        assert_eq!(PropertyPath::parse("a..b").segments(), ["a", "", "b"]);
        assert_eq!(PropertyPath::parse("").segments(), [""]);
    }

    #[test]
    fn test_set_empty_path_names_empty_key() {
        let mut state = json!({"a": 1});
        set_path(&mut state, &"".into(), json!(2));
        assert_eq!(state, json!({"a": 1, "": 2}));
    }

    #[test]
    fn test_path_from_value() {
        let path = PropertyPath::from_value(&json!(["a", 0, "b"]));
        assert_eq!(path.segments(), ["a", "0", "b"]);
        assert!(PropertyPath::from_value(&json!(null)).is_empty());
    }

    #[test]
    fn test_set_path_creates_containers() {
        let mut state = json!({});
        set_path(&mut state, &"a.b".into(), json!(1));
        set_path(&mut state, &"list[1].name".into(), json!("x"));
        assert_eq!(
            state,
            json!({"a": {"b": 1}, "list": [null, {"name": "x"}]})
        );
    }

    #[test]
    fn test_set_path_replaces_scalar_intermediate() {
        let mut state = json!({"a": 1});
        set_path(&mut state, &"a.b".into(), json!(2));
        assert_eq!(state, json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_set_path_on_scalar_root_is_ignored() {
        let mut state = json!(5);
        set_path(&mut state, &"a".into(), json!(1));
        assert_eq!(state, json!(5));
    }

    #[test]
    fn test_set_path_index_gap_limit() {
        let mut state = json!({"a": []});
        set_path(&mut state, &"a[999999]".into(), json!(1));
        assert_eq!(state, json!({"a": []}));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_as_index() {
        assert_eq!(as_index(&json!(3)), Some(3));
        assert_eq!(as_index(&json!(-2)), Some(-2));
        assert_eq!(as_index(&json!(1.9)), Some(1));
        assert_eq!(as_index(&json!("1")), None);
        assert_eq!(as_index(&json!(null)), None);
    }

    #[test]
    fn test_insert_clamps() {
        let mut list = vec![json!(1), json!(2)];
        insert_at(&mut list, 1, vec![json!(8), json!(9)]);
        assert_eq!(list, vec![json!(1), json!(8), json!(9), json!(2)]);

        insert_at(&mut list, 100, vec![json!(0)]);
        assert_eq!(list.last(), Some(&json!(0)));

        insert_at(&mut list, -100, vec![json!(-1)]);
        assert_eq!(list.first(), Some(&json!(-1)));
    }

    #[test]
    fn test_replace_and_remove_bounds() {
        let mut list = vec![json!("a"), json!("b"), json!("c")];

        replace_at(&mut list, -1, json!("z"));
        replace_at(&mut list, 3, json!("nope"));
        assert_eq!(list, vec![json!("a"), json!("b"), json!("z")]);

        remove_at(&mut list, 5);
        remove_at(&mut list, -4);
        assert_eq!(list.len(), 3);

        remove_at(&mut list, 0);
        assert_eq!(list, vec![json!("b"), json!("z")]);
    }

    #[test]
    fn test_as_sequence() {
        assert!(as_sequence(None).is_empty());
        assert!(as_sequence(Some(&json!(null))).is_empty());
        assert_eq!(as_sequence(Some(&json!([1, 2]))), vec![json!(1), json!(2)]);
        assert_eq!(as_sequence(Some(&json!({"a": 1}))), vec![json!({"a": 1})]);
    }
}
