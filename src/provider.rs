//! `SliceProvider` ties key registration, handlers, and state together.

use crate::actions::{ActionCreators, ListActionCreators};
use crate::error::Result;
use crate::handlers::{Handler, HandlerTable};
use crate::reducer::Reducer;
use crate::registry::SliceContext;
use crate::state::deep_merge;
use crate::types::{Action, ActionType, SharedState, SliceKey, SliceKind};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Slice configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Namespace key. Derived from the clock when absent or empty.
    pub key: Option<String>,

    /// State shape.
    #[serde(alias = "type")]
    pub kind: SliceKind,

    /// Merged over the template for `kind`.
    pub initial_state: Option<Value>,
}

impl SliceConfig {
    /// Config for a single-object slice.
    pub fn single() -> Self {
        Self::default()
    }

    /// Config for a list slice.
    pub fn list() -> Self {
        Self {
            kind: SliceKind::List,
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_initial_state(mut self, initial_state: Value) -> Self {
        self.initial_state = Some(initial_state);
        self
    }
}

/// Builds the action creators and reducer for one slice of state.
///
/// Construct it, register custom operations, then take the
/// [`ActionCreators`] and [`Reducer`]. Both are snapshots: registrations
/// made afterwards need a fresh call to show up.
#[derive(Debug)]
pub struct SliceProvider {
    key: SliceKey,
    kind: SliceKind,
    initial_state: Value,
    handlers: HandlerTable,
}

impl SliceProvider {
    /// Create a slice in the process-wide context.
    pub fn new(config: SliceConfig) -> Result<Self> {
        Self::with_context(config, SliceContext::global())
    }

    /// Create a slice against an explicit context.
    pub fn with_context(config: SliceConfig, context: &SliceContext) -> Result<Self> {
        let key = context.keys().derive_key(config.key.as_deref())?;

        let mut initial_state = context.templates().initial_for(config.kind);
        if let Some(ref partial) = config.initial_state {
            deep_merge(&mut initial_state, partial);
        }

        tracing::debug!(key = %key, kind = %config.kind, "slice created");

        Ok(Self {
            handlers: HandlerTable::new(key.clone(), config.kind),
            key,
            kind: config.kind,
            initial_state,
        })
    }

    pub fn key(&self) -> &SliceKey {
        &self.key
    }

    pub fn kind(&self) -> SliceKind {
        self.kind
    }

    /// Fully-qualified type for an operation of this slice.
    pub fn action_type(&self, operation: &str) -> ActionType {
        ActionType::new(&self.key, operation)
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    // --- Direct registration ---

    /// Register a handler into its slot under `name`.
    pub fn register(&mut self, name: &str, handler: Handler) -> Result<&mut Self> {
        self.handlers.register(name, handler)?;
        Ok(self)
    }

    /// Register a custom reducer.
    pub fn register_reducer<F>(&mut self, name: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(SharedState, &Action) -> SharedState + Send + Sync + 'static,
    {
        self.register(name, Handler::reducer(f))
    }

    /// Register a custom action creator.
    pub fn register_action<F>(&mut self, name: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(&ActionType, &[Value]) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.register(name, Handler::action(f))
    }

    // --- Scoped registration ---

    /// Open `name`; following [`action`](Self::action) and
    /// [`reducer`](Self::reducer) calls register under it.
    pub fn begin(&mut self, name: &str) -> Result<&mut Self> {
        self.handlers.begin(name)?;
        Ok(self)
    }

    pub fn action<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: Fn(&ActionType, &[Value]) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.handlers.action(f)?;
        Ok(self)
    }

    pub fn reducer<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: Fn(SharedState, &Action) -> SharedState + Send + Sync + 'static,
    {
        self.handlers.reducer(f)?;
        Ok(self)
    }

    pub fn end(&mut self) -> &mut Self {
        self.handlers.end();
        self
    }

    // --- State ---

    /// Deep-merge `partial` into this slice's initial state.
    pub fn set_initial_state(&mut self, partial: &Value) -> &mut Self {
        deep_merge(&mut self.initial_state, partial);
        self
    }

    pub fn initial_state(&self) -> &Value {
        &self.initial_state
    }

    // --- Outputs ---

    /// The reducer for this slice, as registered so far.
    pub fn get_reducer(&self) -> Reducer {
        Reducer::new(
            self.key.clone(),
            self.kind,
            Arc::new(self.initial_state.clone()),
            Arc::new(self.handlers.clone()),
        )
    }

    /// Creators for `set`, `merge`, and custom operations.
    pub fn get_action_creators(&self) -> ActionCreators {
        ActionCreators::new(self.key.clone(), self.kind, &self.handlers)
    }

    /// Creators including the list built-ins. Fails for single slices.
    pub fn get_list_action_creators(&self) -> Result<ListActionCreators> {
        ListActionCreators::new(self.get_action_creators())
    }

    /// The (action creators, reducer) pair.
    pub fn build(&self) -> (ActionCreators, Reducer) {
        (self.get_action_creators(), self.get_reducer())
    }
}
