//! The reducer a slice hands to an external dispatcher.
//!
//! Dispatch per action:
//! 1. Actions outside the slice's `KEY_` namespace return the input state.
//! 2. List slices try the list built-ins (`FILL`, `PUSH`, ...).
//! 3. Every slice tries `SET` and `MERGE`.
//! 4. Anything else goes to the custom reducer registered for the
//!    operation, or returns the input state if there is none.
//!
//! Built-ins clone the state before changing it; custom reducers receive the
//! shared state and decide for themselves.

mod ops;

pub use ops::{is_builtin, ListOp, SingleOp};

use crate::handlers::HandlerTable;
use crate::state::{
    as_index, as_sequence, deep_merge, field_mut, insert_at, is_truthy, list_mut, remove_at,
    replace_at, set_path, PropertyPath, LIST_FIELD, TOTAL_FIELD, VALUE_FIELD,
};
use crate::types::{Action, SharedState, SliceKey, SliceKind};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Pure `(state, action) -> state` function for one slice.
///
/// Cheap to clone and safe to share across threads.
///
/// The reducer is a snapshot of the provider's handlers and initial state.
/// After `register_*`, `begin`/`end` or `set_initial_state`, call
/// [`SliceProvider::get_reducer`](crate::SliceProvider::get_reducer) again to
/// pick up the change.
#[derive(Clone)]
pub struct Reducer {
    key: SliceKey,
    kind: SliceKind,
    initial: SharedState,
    handlers: Arc<HandlerTable>,
}

impl Reducer {
    pub(crate) fn new(
        key: SliceKey,
        kind: SliceKind,
        initial: SharedState,
        handlers: Arc<HandlerTable>,
    ) -> Self {
        Self {
            key,
            kind,
            initial,
            handlers,
        }
    }

    pub fn key(&self) -> &SliceKey {
        &self.key
    }

    pub fn kind(&self) -> SliceKind {
        self.kind
    }

    /// State used when `reduce` is called without one.
    pub fn initial_state(&self) -> SharedState {
        Arc::clone(&self.initial)
    }

    /// Apply `action` to `state` (or to the initial state when `None`).
    ///
    /// Never fails. Returns the same `Arc` when the action is foreign or
    /// unhandled.
    pub fn reduce(&self, state: Option<SharedState>, action: &Action) -> SharedState {
        let state = state.unwrap_or_else(|| Arc::clone(&self.initial));

        let Some(operation) = self.key.operation_of(action.action_type()) else {
            return state;
        };

        if self.kind == SliceKind::List {
            if let Some(op) = ListOp::parse(operation) {
                let mut next = (*state).clone();
                apply_list(&mut next, op, action);
                tracing::trace!(key = %self.key, operation = op.name(), "list built-in applied");
                return Arc::new(next);
            }
        }

        self.reduce_single(state, operation, action)
    }

    fn reduce_single(&self, state: SharedState, operation: &str, action: &Action) -> SharedState {
        if let Some(op) = SingleOp::parse(operation) {
            let mut next = (*state).clone();
            apply_single(&mut next, op, action);
            tracing::trace!(key = %self.key, operation = op.name(), "built-in applied");
            return Arc::new(next);
        }

        match self.handlers.reducer_for(operation) {
            Some(handler) => {
                tracing::trace!(key = %self.key, operation, "custom reducer applied");
                handler(state, action)
            }
            None => {
                tracing::trace!(key = %self.key, operation, "no handler, state unchanged");
                state
            }
        }
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("handlers", &self.handlers.names())
            .finish()
    }
}

/// Apply a `SET`/`MERGE` to an already-cloned state.
fn apply_single(state: &mut Value, op: SingleOp, action: &Action) {
    let Some(target) = state.get_mut(VALUE_FIELD) else {
        return;
    };

    match op {
        SingleOp::Set => {
            let path = action
                .get("path")
                .map(PropertyPath::from_value)
                .unwrap_or_default();
            let value = action.value().cloned().unwrap_or(Value::Null);
            set_path(target, &path, value);
        }
        SingleOp::Merge => {
            if let Some(source) = action.value() {
                deep_merge(target, source);
            }
        }
    }
}

/// Apply a list built-in to an already-cloned state.
fn apply_list(state: &mut Value, op: ListOp, action: &Action) {
    if op == ListOp::Fill {
        let values = as_sequence(action.value());
        let total = match action.get("total") {
            Some(Value::Number(n)) => Value::Number(n.clone()),
            _ => Value::from(values.len()),
        };
        if let Some(list) = field_mut(state, LIST_FIELD) {
            *list = Value::Array(values);
        }
        if let Some(slot) = field_mut(state, TOTAL_FIELD) {
            *slot = total;
        }
        return;
    }

    let Some(list) = list_mut(state) else {
        return;
    };
    let index = action.get("index").and_then(as_index);

    match op {
        ListOp::Fill => {}
        ListOp::Shift => {
            if !list.is_empty() {
                list.remove(0);
            }
        }
        ListOp::Unshift => {
            list.splice(0..0, as_sequence(action.value()));
        }
        ListOp::Pop => {
            list.pop();
        }
        ListOp::Push => {
            list.extend(as_sequence(action.value()));
        }
        ListOp::Insert => {
            if let Some(index) = index {
                insert_at(list, index, as_sequence(action.value()));
            }
        }
        ListOp::Replace => {
            if let Some(callback) = action.callback() {
                *list = list
                    .iter()
                    .enumerate()
                    .map(|(i, element)| callback.call(element, i))
                    .collect();
            } else if let Some(index) = index {
                let value = action.value().cloned().unwrap_or(Value::Null);
                replace_at(list, index, value);
            }
        }
        ListOp::Remove => {
            if let Some(callback) = action.callback() {
                *list = list
                    .drain(..)
                    .enumerate()
                    .filter(|(i, element)| is_truthy(&callback.call(element, *i)))
                    .map(|(_, element)| element)
                    .collect();
            } else if let Some(index) = index {
                remove_at(list, index);
            }
        }
    }
}
