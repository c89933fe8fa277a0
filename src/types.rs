//! Core types for slices and actions.

use crate::error::{Result, SliceError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Separator between a slice key and an operation name.
pub const TYPE_SEPARATOR: char = '_';

/// Namespace key of one slice.
///
/// Only the key registry creates keys, and a key never changes after its
/// slice is constructed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SliceKey(String);

impl SliceKey {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        SliceKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `KEY_` prefix every action type of this slice starts with.
    pub fn prefix(&self) -> String {
        format!("{}{}", self.0, TYPE_SEPARATOR)
    }

    /// Strip this slice's prefix from an action type.
    ///
    /// Returns `None` for action types belonging to another namespace.
    pub fn operation_of<'a>(&self, action_type: &'a str) -> Option<&'a str> {
        action_type
            .strip_prefix(self.0.as_str())?
            .strip_prefix(TYPE_SEPARATOR)
    }
}

impl fmt::Debug for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SliceKey({})", self.0)
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize an operation name for use in action types and handler lookup.
pub fn normalize_operation(name: &str) -> String {
    name.to_uppercase()
}

/// Fully-qualified action type, `KEY_OPERATION`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionType(String);

impl ActionType {
    pub fn new(key: &SliceKey, operation: &str) -> Self {
        ActionType(format!(
            "{}{}{}",
            key.as_str(),
            TYPE_SEPARATOR,
            normalize_operation(operation)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionType({})", self.0)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for ActionType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ActionType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Milliseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(duration.as_millis() as u64)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// Shape of the state a slice manages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    /// `{ value: {...} }`
    #[default]
    Single,
    /// `{ list: [...], total: n, value: {...} }`
    List,
}

impl fmt::Display for SliceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceKind::Single => write!(f, "single"),
            SliceKind::List => write!(f, "list"),
        }
    }
}

/// State as it flows through a reducer.
///
/// A reducer that does not handle an action hands back the same `Arc`.
pub type SharedState = Arc<Value>;

/// Callable stand-in for a list index.
///
/// `REPLACE` uses the result as the new element; `REMOVE` keeps the element
/// when the result is truthy.
#[derive(Clone)]
pub struct ElementFn(Arc<dyn Fn(&Value, usize) -> Value + Send + Sync>);

impl ElementFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, usize) -> Value + Send + Sync + 'static,
    {
        ElementFn(Arc::new(f))
    }

    /// Wrap a predicate; its result becomes a JSON boolean.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value, usize) -> bool + Send + Sync + 'static,
    {
        ElementFn(Arc::new(move |v, i| Value::Bool(f(v, i))))
    }

    pub fn call(&self, element: &Value, index: usize) -> Value {
        (self.0)(element, index)
    }
}

impl fmt::Debug for ElementFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementFn(..)")
    }
}

/// Wire encoding for actions handed to an external dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEncoding {
    #[default]
    Json,
    MessagePack,
}

/// A plain tagged record describing one operation invocation.
///
/// Serializes flat, as `{ "type": ..., ...payload }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    action_type: String,

    #[serde(flatten)]
    payload: Map<String, Value>,

    /// Callable form of `index`; never serialized.
    #[serde(skip)]
    callback: Option<ElementFn>,
}

impl Action {
    /// Create an action with an empty payload.
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Map::new(),
            callback: None,
        }
    }

    /// Create an action from a type and payload fields.
    ///
    /// A `type` entry in `payload` is discarded.
    pub fn from_parts(action_type: impl Into<String>, mut payload: Map<String, Value>) -> Self {
        payload.remove("type");
        Self {
            action_type: action_type.into(),
            payload,
            callback: None,
        }
    }

    /// Parse a hand-written action record.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(mut fields) => match fields.remove("type") {
                Some(Value::String(action_type)) => Ok(Self::from_parts(action_type, fields)),
                Some(other) => Err(SliceError::Deserialization(format!(
                    "action type must be a string, got {}",
                    other
                ))),
                None => Err(SliceError::Deserialization(
                    "action record has no type".to_string(),
                )),
            },
            other => Err(SliceError::Deserialization(format!(
                "action must be an object, got {}",
                other
            ))),
        }
    }

    /// Add a payload field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if name != "type" {
            self.payload.insert(name, value.into());
        }
        self
    }

    /// Attach a callable index.
    pub fn with_callback(mut self, callback: ElementFn) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    pub fn value(&self) -> Option<&Value> {
        self.get("value")
    }

    pub fn callback(&self) -> Option<&ElementFn> {
        self.callback.as_ref()
    }

    /// The record as JSON. Callbacks are dropped.
    pub fn to_json(&self) -> Value {
        let mut fields = self.payload.clone();
        fields.insert("type".to_string(), Value::String(self.action_type.clone()));
        Value::Object(fields)
    }

    /// Encode for transport. Callbacks are dropped.
    pub fn encode(&self, encoding: ActionEncoding) -> Result<Vec<u8>> {
        match encoding {
            ActionEncoding::Json => Ok(serde_json::to_vec(self)?),
            ActionEncoding::MessagePack => Ok(rmp_serde::to_vec(&self.to_json())?),
        }
    }

    /// Decode an action produced by [`Action::encode`] or by a foreign producer.
    pub fn decode(bytes: &[u8], encoding: ActionEncoding) -> Result<Self> {
        let value: Value = match encoding {
            ActionEncoding::Json => serde_json::from_slice(bytes)
                .map_err(|e| SliceError::Deserialization(e.to_string()))?,
            ActionEncoding::MessagePack => rmp_serde::from_slice(bytes)?,
        };
        Self::from_json(value)
    }
}
