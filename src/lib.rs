//! # Observable State
//!
//! A minimal in-memory observable state container: a flat set of named
//! properties with synchronous change notification.
//!
//! ## Core Concepts
//!
//! - **Properties**: named slots holding opaque [`serde_json::Value`]s
//! - **Updates**: batched shallow merges applied atomically from the
//!   caller's point of view
//! - **Subscribers**: per-property listeners invoked when an update
//!   touches their property
//! - **Wildcard**: a single listener invoked once per update, after all
//!   per-property listeners
//!
//! ## Example
//!
//! ```ignore
//! use observable_state::{listener, ObservableState};
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! let state = ObservableState::with_initial(HashMap::from([
//!     ("count".to_string(), json!(0)),
//! ]));
//!
//! state.subscribe("count", listener(|st| {
//!     println!("count is now {:?}", st.get("count"));
//! }));
//!
//! state.update(HashMap::from([("count".to_string(), json!(1))]));
//! ```

pub mod error;
pub mod state;
pub mod subscribers;

// Re-exports
pub use error::{Result, StateError};
pub use state::ObservableState;
pub use subscribers::{listener, Listener, ListenerSet, SubscriberRegistry};
