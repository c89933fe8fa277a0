//! Action creators for a slice.

use crate::error::{Result, SliceError};
use crate::handlers::{BoundAction, HandlerTable};
use crate::reducer::{ListOp, SingleOp};
use crate::types::{Action, ActionType, ElementFn, SliceKey, SliceKind};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Deref;

/// Creators for the built-ins every slice has plus registered custom ones.
#[derive(Clone, Debug)]
pub struct ActionCreators {
    key: SliceKey,
    kind: SliceKind,
    /// Custom creators by lower-case operation name.
    custom: BTreeMap<String, BoundAction>,
}

impl ActionCreators {
    pub(crate) fn new(key: SliceKey, kind: SliceKind, handlers: &HandlerTable) -> Self {
        let custom = handlers
            .actions()
            .map(|(name, action)| (name.to_lowercase(), action.clone()))
            .collect();

        Self { key, kind, custom }
    }

    pub fn key(&self) -> &SliceKey {
        &self.key
    }

    /// Fully-qualified type for an operation of this slice.
    pub fn action_type(&self, operation: &str) -> ActionType {
        ActionType::new(&self.key, operation)
    }

    /// Assign `value` at `path` (a path string or an array of segments).
    pub fn set(&self, path: impl Into<Value>, value: impl Into<Value>) -> Action {
        self.builtin(SingleOp::Set.name())
            .with_field("path", path)
            .with_field("value", value)
    }

    /// Deep-merge `value` into the slice's `value` object.
    pub fn merge(&self, value: impl Into<Value>) -> Action {
        self.builtin(SingleOp::Merge.name()).with_field("value", value)
    }

    /// Invoke a custom creator by (case-insensitive) name.
    pub fn create(&self, name: &str, args: &[Value]) -> Result<Action> {
        self.get(name)
            .map(|creator| creator.call(args))
            .ok_or_else(|| SliceError::UnknownOperation(name.to_string()))
    }

    /// Custom creator by (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&BoundAction> {
        self.custom.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.custom.contains_key(&name) || self.builtin_names().any(|b| b == name)
    }

    /// All creator names, built-ins first.
    pub fn names(&self) -> Vec<String> {
        self.builtin_names()
            .chain(self.custom.keys().cloned())
            .collect()
    }

    fn builtin_names(&self) -> impl Iterator<Item = String> + '_ {
        let single_ops: &'static [SingleOp] = &SingleOp::ALL;
        let list_ops: &'static [ListOp] = match self.kind {
            SliceKind::List => &ListOp::ALL,
            SliceKind::Single => &[],
        };
        single_ops
            .iter()
            .map(|op| op.name())
            .chain(list_ops.iter().map(|op| op.name()))
            .map(str::to_lowercase)
    }

    fn builtin(&self, operation: &str) -> Action {
        Action::new(self.action_type(operation).as_str())
    }
}

/// Creators for a list slice: the [`ActionCreators`] plus list built-ins.
#[derive(Clone, Debug)]
pub struct ListActionCreators {
    base: ActionCreators,
}

impl ListActionCreators {
    pub(crate) fn new(base: ActionCreators) -> Result<Self> {
        if base.kind != SliceKind::List {
            return Err(SliceError::KindMismatch {
                expected: SliceKind::List.to_string(),
                got: base.kind.to_string(),
            });
        }
        Ok(Self { base })
    }

    /// Replace the list. `total` defaults to the list length.
    pub fn fill(&self, values: Vec<Value>, total: Option<u64>) -> Action {
        let action = self.list_op(ListOp::Fill).with_field("value", values);
        match total {
            Some(total) => action.with_field("total", total),
            None => action,
        }
    }

    /// Drop the first element.
    pub fn shift(&self) -> Action {
        self.list_op(ListOp::Shift)
    }

    /// Prepend `values`, keeping their order.
    pub fn unshift(&self, values: Vec<Value>) -> Action {
        self.list_op(ListOp::Unshift).with_field("value", values)
    }

    /// Drop the last element.
    pub fn pop(&self) -> Action {
        self.list_op(ListOp::Pop)
    }

    /// Append `values`, keeping their order.
    pub fn push(&self, values: Vec<Value>) -> Action {
        self.list_op(ListOp::Push).with_field("value", values)
    }

    /// Splice `values` in at `index`.
    pub fn insert(&self, index: i64, values: Vec<Value>) -> Action {
        self.list_op(ListOp::Insert)
            .with_field("index", index)
            .with_field("value", values)
    }

    /// Replace the element at `index`.
    pub fn replace(&self, index: i64, value: impl Into<Value>) -> Action {
        self.list_op(ListOp::Replace)
            .with_field("index", index)
            .with_field("value", value)
    }

    /// Map every element through `f`.
    pub fn replace_with<F>(&self, f: F) -> Action
    where
        F: Fn(&Value, usize) -> Value + Send + Sync + 'static,
    {
        self.list_op(ListOp::Replace).with_callback(ElementFn::new(f))
    }

    /// Remove the element at `index`.
    pub fn remove(&self, index: i64) -> Action {
        self.list_op(ListOp::Remove).with_field("index", index)
    }

    /// Keep only the elements `f` accepts; the rest are removed.
    pub fn retain<F>(&self, f: F) -> Action
    where
        F: Fn(&Value, usize) -> bool + Send + Sync + 'static,
    {
        self.list_op(ListOp::Remove)
            .with_callback(ElementFn::predicate(f))
    }

    fn list_op(&self, op: ListOp) -> Action {
        self.base.builtin(op.name())
    }
}

impl Deref for ListActionCreators {
    type Target = ActionCreators;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
