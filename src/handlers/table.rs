//! Per-slice table of custom operations.

use crate::error::{Result, SliceError};
use crate::reducer::is_builtin;
use crate::types::{normalize_operation, Action, ActionType, SharedState, SliceKey, SliceKind};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Custom reducer: `(state, action) -> state`.
///
/// The handler owns immutability: it receives the shared state and must
/// return either it or a fresh value.
pub type ReducerFn = Arc<dyn Fn(SharedState, &Action) -> SharedState + Send + Sync>;

/// Custom action creator: `(type, args) -> payload fields`.
pub type ActionFn = Arc<dyn Fn(&ActionType, &[Value]) -> Map<String, Value> + Send + Sync>;

/// Which half of an entry a handler fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerSlot {
    Action,
    Reducer,
}

impl fmt::Display for HandlerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerSlot::Action => write!(f, "action"),
            HandlerSlot::Reducer => write!(f, "reducer"),
        }
    }
}

/// A handler ready to be placed in a slot.
#[derive(Clone)]
pub enum Handler {
    Action(ActionFn),
    Reducer(ReducerFn),
}

impl Handler {
    pub fn action<F>(f: F) -> Self
    where
        F: Fn(&ActionType, &[Value]) -> Map<String, Value> + Send + Sync + 'static,
    {
        Handler::Action(Arc::new(f))
    }

    pub fn reducer<F>(f: F) -> Self
    where
        F: Fn(SharedState, &Action) -> SharedState + Send + Sync + 'static,
    {
        Handler::Reducer(Arc::new(f))
    }

    pub fn slot(&self) -> HandlerSlot {
        match self {
            Handler::Action(_) => HandlerSlot::Action,
            Handler::Reducer(_) => HandlerSlot::Reducer,
        }
    }
}

/// Action creator pre-bound to its fully-qualified type.
#[derive(Clone)]
pub struct BoundAction {
    action_type: ActionType,
    creator: ActionFn,
}

impl BoundAction {
    pub fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    /// Build the action: the creator's fields plus `type`.
    pub fn call(&self, args: &[Value]) -> Action {
        let fields = (self.creator)(&self.action_type, args);
        Action::from_parts(self.action_type.as_str(), fields)
    }
}

impl fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundAction({})", self.action_type)
    }
}

/// Handlers registered under one operation name. Each slot is write-once.
#[derive(Clone, Default)]
pub struct HandlerEntry {
    pub action: Option<BoundAction>,
    pub reducer: Option<ReducerFn>,
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("action", &self.action)
            .field("reducer", &self.reducer.is_some())
            .finish()
    }
}

/// Custom operations of one slice, keyed by upper-case operation name.
///
/// Supports direct registration ([`HandlerTable::register`]) and a scoped
/// style where [`HandlerTable::begin`] opens a name that following
/// [`HandlerTable::action`] / [`HandlerTable::reducer`] calls fill in.
#[derive(Clone, Debug)]
pub struct HandlerTable {
    key: SliceKey,
    kind: SliceKind,
    entries: BTreeMap<String, HandlerEntry>,
    /// Name opened by `begin`, if any.
    open: Option<String>,
}

impl HandlerTable {
    pub fn new(key: SliceKey, kind: SliceKind) -> Self {
        Self {
            key,
            kind,
            entries: BTreeMap::new(),
            open: None,
        }
    }

    /// Register a handler into the slot it belongs to.
    pub fn register(&mut self, name: &str, handler: Handler) -> Result<&mut Self> {
        let name = self.validate(name)?;
        self.insert(name, handler)?;
        Ok(self)
    }

    /// Open `name` for scoped registration.
    pub fn begin(&mut self, name: &str) -> Result<&mut Self> {
        if let Some(ref open) = self.open {
            return Err(SliceError::InvalidState(format!(
                "'{}' is still open; call end() first",
                open
            )));
        }

        let name = self.validate(name)?;
        if self.entries.contains_key(&name) {
            return Err(SliceError::DuplicateRegistration(name));
        }

        self.open = Some(name);
        Ok(self)
    }

    /// Register an action creator for the open name.
    pub fn action<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: Fn(&ActionType, &[Value]) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.register_open(Handler::action(f))
    }

    /// Register a reducer for the open name.
    pub fn reducer<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: Fn(SharedState, &Action) -> SharedState + Send + Sync + 'static,
    {
        self.register_open(Handler::reducer(f))
    }

    /// Close the open name.
    pub fn end(&mut self) -> &mut Self {
        self.open = None;
        self
    }

    /// Name currently opened by `begin`.
    pub fn open_name(&self) -> Option<&str> {
        self.open.as_deref()
    }

    /// Custom reducer for an operation (case-insensitive).
    pub fn reducer_for(&self, operation: &str) -> Option<&ReducerFn> {
        self.entries
            .get(&normalize_operation(operation))?
            .reducer
            .as_ref()
    }

    /// Custom action creator for an operation (case-insensitive).
    pub fn action_for(&self, operation: &str) -> Option<&BoundAction> {
        self.entries
            .get(&normalize_operation(operation))?
            .action
            .as_ref()
    }

    pub fn entry(&self, operation: &str) -> Option<&HandlerEntry> {
        self.entries.get(&normalize_operation(operation))
    }

    /// Registered action creators by upper-case name.
    pub fn actions(&self) -> impl Iterator<Item = (&str, &BoundAction)> {
        self.entries
            .iter()
            .filter_map(|(name, entry)| entry.action.as_ref().map(|a| (name.as_str(), a)))
    }

    /// Registered operation names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn register_open(&mut self, handler: Handler) -> Result<&mut Self> {
        let Some(name) = self.open.clone() else {
            return Err(SliceError::InvalidState(format!(
                "{}() called before begin()",
                handler.slot()
            )));
        };
        self.insert(name, handler)?;
        Ok(self)
    }

    /// Normalize a name and reject ones no action could ever reach.
    fn validate(&self, name: &str) -> Result<String> {
        if name.trim().is_empty() {
            return Err(SliceError::InvalidHandler {
                name: name.to_string(),
                reason: "operation name is empty".to_string(),
            });
        }

        let name = normalize_operation(name);
        if is_builtin(self.kind, &name) {
            return Err(SliceError::InvalidHandler {
                reason: format!("'{}' is a built-in {} operation", name, self.kind),
                name,
            });
        }

        Ok(name)
    }

    fn insert(&mut self, name: String, handler: Handler) -> Result<()> {
        let slot = handler.slot();
        let action_type = ActionType::new(&self.key, &name);
        let entry = self.entries.entry(name.clone()).or_default();

        match handler {
            Handler::Action(creator) => {
                if entry.action.is_some() {
                    return Err(SliceError::DuplicateRegistration(format!(
                        "{} ({})",
                        name, slot
                    )));
                }
                entry.action = Some(BoundAction {
                    action_type,
                    creator,
                });
            }
            Handler::Reducer(reducer) => {
                if entry.reducer.is_some() {
                    return Err(SliceError::DuplicateRegistration(format!(
                        "{} ({})",
                        name, slot
                    )));
                }
                entry.reducer = Some(reducer);
            }
        }

        tracing::debug!(key = %self.key, operation = %name, %slot, "handler registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(kind: SliceKind) -> HandlerTable {
        HandlerTable::new(SliceKey::new("T"), kind)
    }

    fn identity(state: SharedState, _: &Action) -> SharedState {
        state
    }

    #[test]
    fn test_register_is_case_insensitive() {
        let mut table = table(SliceKind::Single);
        table
            .register("increment", Handler::reducer(identity))
            .unwrap();

        assert!(table.reducer_for("INCREMENT").is_some());
        assert!(table.reducer_for("Increment").is_some());
        assert_eq!(table.names(), vec!["INCREMENT"]);
    }

    #[test]
    fn test_duplicate_reducer_fails() {
        let mut table = table(SliceKind::Single);
        table.register("inc", Handler::reducer(identity)).unwrap();

        let result = table.register("INC", Handler::reducer(identity));
        assert!(matches!(result, Err(SliceError::DuplicateRegistration(_))));
    }

    #[test]
    fn test_slots_fill_independently() {
        let mut table = table(SliceKind::Single);
        table.register("inc", Handler::reducer(identity)).unwrap();
        table
            .register("inc", Handler::action(|_, _| Map::new()))
            .unwrap();

        let entry = table.entry("inc").unwrap();
        assert!(entry.action.is_some());
        assert!(entry.reducer.is_some());

        let result = table.register("inc", Handler::action(|_, _| Map::new()));
        assert!(matches!(result, Err(SliceError::DuplicateRegistration(_))));
    }

    #[test]
    fn test_invalid_names() {
        let mut single = table(SliceKind::Single);
        assert!(matches!(
            single.register("  ", Handler::reducer(identity)),
            Err(SliceError::InvalidHandler { .. })
        ));
        assert!(matches!(
            single.register("set", Handler::reducer(identity)),
            Err(SliceError::InvalidHandler { .. })
        ));
        // PUSH is only built in for lists.
        assert!(single.register("push", Handler::reducer(identity)).is_ok());

        let mut list = table(SliceKind::List);
        assert!(matches!(
            list.register("push", Handler::reducer(identity)),
            Err(SliceError::InvalidHandler { .. })
        ));
    }

    #[test]
    fn test_scoped_registration() {
        let mut table = table(SliceKind::Single);
        table
            .begin("rename")
            .unwrap()
            .action(|ty, args| {
                let mut fields = Map::new();
                fields.insert("name".into(), args.first().cloned().unwrap_or_default());
                fields.insert("seen".into(), json!(ty.as_str()));
                fields
            })
            .unwrap()
            .reducer(identity)
            .unwrap()
            .end();

        assert!(table.open_name().is_none());

        let action = table.action_for("rename").unwrap().call(&[json!("bob")]);
        assert_eq!(action.action_type(), "T_RENAME");
        assert_eq!(action.get("name"), Some(&json!("bob")));
        assert_eq!(action.get("seen"), Some(&json!("T_RENAME")));
    }

    #[test]
    fn test_scoped_without_begin() {
        let mut table = table(SliceKind::Single);
        assert!(matches!(
            table.reducer(identity),
            Err(SliceError::InvalidState(_))
        ));
        assert!(matches!(
            table.action(|_, _| Map::new()),
            Err(SliceError::InvalidState(_))
        ));
    }

    #[test]
    fn test_begin_existing_name_fails() {
        let mut table = table(SliceKind::Single);
        table.register("inc", Handler::reducer(identity)).unwrap();

        assert!(matches!(
            table.begin("INC"),
            Err(SliceError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn test_begin_while_open_fails() {
        let mut table = table(SliceKind::Single);
        table.begin("a").unwrap();

        assert!(matches!(table.begin("b"), Err(SliceError::InvalidState(_))));

        table.end();
        assert!(table.begin("b").is_ok());
    }

    #[test]
    fn test_scoped_duplicate_slot() {
        let mut table = table(SliceKind::Single);
        table.begin("a").unwrap().reducer(identity).unwrap();

        assert!(matches!(
            table.reducer(identity),
            Err(SliceError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn test_creator_cannot_override_type() {
        let mut table = table(SliceKind::Single);
        table
            .register(
                "sneaky",
                Handler::action(|_, _| {
                    let mut fields = Map::new();
                    fields.insert("type".into(), json!("OTHER_SET"));
                    fields
                }),
            )
            .unwrap();

        let action = table.action_for("sneaky").unwrap().call(&[]);
        assert_eq!(action.action_type(), "T_SNEAKY");
    }
}
