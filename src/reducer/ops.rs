//! Built-in operations recognized by the reducer.

use crate::types::SliceKind;

/// Built-ins every slice understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SingleOp {
    /// Assign `value` at `path` inside `state.value`.
    Set,
    /// Deep-merge `value` into `state.value`.
    Merge,
}

impl SingleOp {
    pub const ALL: [SingleOp; 2] = [SingleOp::Set, SingleOp::Merge];

    /// Parse an upper-case operation suffix.
    pub fn parse(operation: &str) -> Option<Self> {
        match operation {
            "SET" => Some(SingleOp::Set),
            "MERGE" => Some(SingleOp::Merge),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SingleOp::Set => "SET",
            SingleOp::Merge => "MERGE",
        }
    }
}

/// Built-ins only list slices understand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListOp {
    Fill,
    Shift,
    Unshift,
    Pop,
    Push,
    Insert,
    Replace,
    Remove,
}

impl ListOp {
    pub const ALL: [ListOp; 8] = [
        ListOp::Fill,
        ListOp::Shift,
        ListOp::Unshift,
        ListOp::Pop,
        ListOp::Push,
        ListOp::Insert,
        ListOp::Replace,
        ListOp::Remove,
    ];

    /// Parse an upper-case operation suffix.
    pub fn parse(operation: &str) -> Option<Self> {
        match operation {
            "FILL" => Some(ListOp::Fill),
            "SHIFT" => Some(ListOp::Shift),
            "UNSHIFT" => Some(ListOp::Unshift),
            "POP" => Some(ListOp::Pop),
            "PUSH" => Some(ListOp::Push),
            "INSERT" => Some(ListOp::Insert),
            "REPLACE" => Some(ListOp::Replace),
            "REMOVE" => Some(ListOp::Remove),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ListOp::Fill => "FILL",
            ListOp::Shift => "SHIFT",
            ListOp::Unshift => "UNSHIFT",
            ListOp::Pop => "POP",
            ListOp::Push => "PUSH",
            ListOp::Insert => "INSERT",
            ListOp::Replace => "REPLACE",
            ListOp::Remove => "REMOVE",
        }
    }
}

/// Whether `operation` (upper-case) is handled by a built-in for `kind`.
pub fn is_builtin(kind: SliceKind, operation: &str) -> bool {
    if SingleOp::parse(operation).is_some() {
        return true;
    }
    kind == SliceKind::List && ListOp::parse(operation).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for op in SingleOp::ALL {
            assert_eq!(SingleOp::parse(op.name()), Some(op));
        }
        for op in ListOp::ALL {
            assert_eq!(ListOp::parse(op.name()), Some(op));
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(SingleOp::parse("set"), None);
        assert_eq!(ListOp::parse("Push"), None);
    }

    #[test]
    fn test_builtin_by_kind() {
        assert!(is_builtin(SliceKind::Single, "MERGE"));
        assert!(!is_builtin(SliceKind::Single, "PUSH"));
        assert!(is_builtin(SliceKind::List, "PUSH"));
        assert!(is_builtin(SliceKind::List, "SET"));
        assert!(!is_builtin(SliceKind::List, "INCREMENT"));
    }
}
