//! Application state and input handling for tau.
//!
//! - [state]: [AppState], the controller owning the table, the workers and the navigation state.
//! - [nav]: the current directory, cursor and scroll offset.
//! - [keymap]: key parsing and the mapping from keys to actions.
//! - [handlers]: key and mouse handlers implemented on [AppState].

pub mod handlers;
pub mod keymap;
pub mod nav;
pub mod state;

pub use keymap::{Action, Keymap, NavAction, SelectAction, SystemAction, TableAction};
pub use nav::NavState;
pub use state::{AppState, KeypressResult, LayoutMetrics};
