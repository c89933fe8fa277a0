//! Custom operations registered on a slice.
//!
//! Each operation name owns a [`HandlerEntry`] with two write-once slots: an
//! action creator, pre-bound to the operation's fully-qualified type, and a
//! reducer that replaces state when an action of that type arrives.
//!
//! # Example
//!
//! ```ignore
//! let mut table = HandlerTable::new(key, SliceKind::Single);
//!
//! table
//!     .begin("increment")?
//!     .action(|_, args| payload(args))?
//!     .reducer(|state, action| bump(state, action))?
//!     .end();
//! ```

mod table;

pub use table::{
    ActionFn, BoundAction, Handler, HandlerEntry, HandlerSlot, HandlerTable, ReducerFn,
};
