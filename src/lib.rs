//! # Slice Provider
//!
//! Namespaced action creators and a matching pure reducer for one slice of
//! application state.
//!
//! ## Core Concepts
//!
//! - **Slices**: independently keyed state, either a single object
//!   (`{ value }`) or a list with pagination metadata (`{ list, total, value }`)
//! - **Keys**: every slice owns a unique namespace; its action types are
//!   `KEY_OPERATION`
//! - **Reducers**: pure `(state, action) -> state`; foreign actions come back
//!   as the very same `Arc`
//! - **Custom operations**: user reducers and action creators registered per
//!   operation name, dispatched after the built-ins
//!
//! Wiring the reducer into a store or dispatcher is left to the caller.
//!
//! ## Example
//!
//! ```ignore
//! use slice_provider::{SliceConfig, SliceProvider};
//! use serde_json::json;
//!
//! let mut todos = SliceProvider::new(SliceConfig::list().with_key("TODOS"))?;
//! todos.register_reducer("clear", |_, _| Arc::new(json!({"list": [], "total": 0})))?;
//!
//! let actions = todos.get_list_action_creators()?;
//! let reducer = todos.get_reducer();
//!
//! let state = reducer.reduce(None, &actions.push(vec![json!("write docs")]));
//! let state = reducer.reduce(Some(state), &actions.merge(json!({"filter": "open"})));
//! ```

pub mod actions;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod reducer;
pub mod registry;
pub mod state;
pub mod types;

// Re-exports
pub use actions::{ActionCreators, ListActionCreators};
pub use error::{Result, SliceError};
pub use handlers::{
    ActionFn, BoundAction, Handler, HandlerEntry, HandlerSlot, HandlerTable, ReducerFn,
};
pub use provider::{SliceConfig, SliceProvider};
pub use reducer::{ListOp, Reducer, SingleOp};
pub use registry::{configure, KeyRegistry, SliceContext, StateTemplates, TemplateConfig};
pub use state::PropertyPath;
pub use types::*;
